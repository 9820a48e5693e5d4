use std::thread;
use std::path::Path;
use std::time::Instant;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };
use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::consts::PROGRESS_ROWS;
use crate::error::{ TraceError, TraceResult };

/// A unit of work for the render threads.
pub enum Message {
    /// Render the pixel at this flat, row-major index.
    Pixel(usize),
    Terminate,
}

/// Shared completion counter for progress reporting.
///
/// Workers bump the counter as they finish pixels; every `step` pixels one of
/// them logs the percentage done. The render itself never waits on this.
struct Progress {
    completed: AtomicUsize,
    total: usize,
    step: usize,
}

impl Progress {
    fn new(total: usize, step: usize) -> Progress {
        Progress {
            completed: AtomicUsize::new(0),
            total,
            step: step.max(1),
        }
    }

    fn tick(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.step == 0 {
            log::info!("Progress: {:.1}%",
                (done as f64 * 100.0) / self.total as f64);
        }
    }
}

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(world: Arc<World>, camera: Arc<Camera>, progress: Arc<Progress>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<(usize, Color)>) -> Worker {

        let thread = thread::spawn(move || loop {
            // The queue lock is dropped before rendering so other workers can
            // pull work meanwhile.
            let message = match receiver.lock() {
                Ok(queue) => queue.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Pixel(index)) => {
                    let (x, y) = camera.pixel_of(index);
                    let ray = camera.ray_for_pixel(x, y);
                    let color = world.color_at(&ray);

                    if results.send((index, color)).is_err() {
                        break;
                    }
                    progress.tick();
                },

                Ok(Message::Terminate) | Err(_) => break,
            }
        });

        Worker { thread: Some(thread) }
    }
}

/// A fixed-size pool of render threads pulling pixels from one work queue.
///
/// Whichever worker is idle takes the next pixel, so work is distributed
/// dynamically. Finished pixels are sent back as `(index, color)` pairs.
/// Dropping the pool stops and joins every worker.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    fn new(size: usize, world: Arc<World>, camera: Arc<Camera>,
        progress: Arc<Progress>, results: mpsc::Sender<(usize, Color)>)
        -> TraceResult<ThreadPool> {
        if size == 0 {
            return Err(TraceError::Render(
                "at least one render thread is required".into()));
        }

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for _ in 0..size {
            workers.push(Worker::new(
                Arc::clone(&world),
                Arc::clone(&camera),
                Arc::clone(&progress),
                Arc::clone(&receiver),
                results.clone(),
            ));
        }

        Ok(ThreadPool { workers, sender })
    }

    /// Queues a message for the workers.
    pub fn execute(&self, message: Message) -> TraceResult<()> {
        self.sender.send(message).map_err(|_| TraceError::Render(
            "render threads exited before all work was queued".into()))
    }

    /// Queues one `Terminate` per worker behind any pending work, so the
    /// workers exit once the queue drains.
    pub fn finish(&self) {
        for _ in &self.workers {
            let _ = self.sender.send(Message::Terminate);
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.finish();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    log::error!("A render thread panicked");
                }
            }
        }
    }
}

/// Owns everything a render pass needs: the world, the camera and the frame
/// buffer the pass fills in.
///
/// The world and camera are never modified after construction, which lets the
/// render threads share them without locks.
pub struct RenderContext {
    world: Arc<World>,
    camera: Arc<Camera>,
    canvas: Canvas,
}

impl RenderContext {
    /// Creates a render context with a black frame buffer sized to the
    /// camera's image.
    pub fn new(world: World, camera: Camera) -> RenderContext {
        let canvas = Canvas::new(camera.width, camera.height);

        RenderContext {
            world: Arc::new(world),
            camera: Arc::new(camera),
            canvas,
        }
    }

    /// The frame buffer, complete once `render` has returned `Ok`.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// Renders every pixel using `threads` worker threads.
    ///
    /// Returns once all pixels are written to the frame buffer. Each pixel is
    /// computed by exactly one worker and stored exactly once, so the
    /// completion order does not affect the result.
    pub fn render(&mut self, threads: usize) -> TraceResult<()> {
        let total = self.camera.pixel_count();
        let start = Instant::now();

        log::info!("Starting parallel render of {}x{} pixels with {} threads...",
            self.camera.width, self.camera.height, threads);

        let progress = Arc::new(
            Progress::new(total, self.camera.width * PROGRESS_ROWS));
        let (results, finished) = mpsc::channel();

        let received = {
            let pool = ThreadPool::new(
                threads,
                Arc::clone(&self.world),
                Arc::clone(&self.camera),
                progress,
                results,
            )?;

            for index in 0..total {
                pool.execute(Message::Pixel(index))?;
            }
            pool.finish();

            let mut received = 0;
            for (index, color) in finished.iter().take(total) {
                self.canvas.write_index(index, &color);
                received += 1;
            }

            received
        };

        if received != total {
            return Err(TraceError::Render(format!(
                "only {} of {} pixels were rendered", received, total)));
        }

        log::info!("Render completed in {:.3} seconds",
            start.elapsed().as_secs_f64());
        Ok(())
    }

    /// Writes the frame buffer as a PPM image and as a BMP image.
    ///
    /// Each encoder runs even if the other one fails. Failures are logged and
    /// returned separately, PPM first.
    pub fn save_images(&self, ppm: &Path, bmp: &Path)
        -> (TraceResult<()>, TraceResult<()>) {
        let ppm_result = self.canvas.save_ppm(ppm);
        match ppm_result {
            Ok(()) => log::info!("Image saved to: {}", ppm.display()),
            Err(ref e) => log::error!("Cannot write {}: {}", ppm.display(), e),
        }

        let bmp_result = self.canvas.save_bmp(bmp);
        match bmp_result {
            Ok(()) => log::info!("BMP image saved to: {}", bmp.display()),
            Err(ref e) => log::error!("Cannot write {}: {}", bmp.display(), e),
        }

        (ppm_result, bmp_result)
    }

    /// Renders every pixel on the calling thread, in index order.
    pub fn render_serial(&mut self) {
        for index in 0..self.camera.pixel_count() {
            let (x, y) = self.camera.pixel_of(index);
            let ray = self.camera.ray_for_pixel(x, y);
            let color = self.world.color_at(&ray);
            self.canvas.write_index(index, &color);
        }
    }
}

/// Renders a world in parallel and returns the finished frame buffer.
pub fn parallel_render(world: World, camera: Camera, threads: usize)
    -> TraceResult<Canvas> {
    let mut context = RenderContext::new(world, camera);
    context.render(threads)?;

    Ok(context.into_canvas())
}

#[cfg(test)]
fn small_scene() -> (World, Camera) {
    use crate::scene::reference_world;
    use crate::vector::Vector3;

    (reference_world(), Camera::new(64, 48, Vector3::zero()))
}

#[cfg(test)]
fn encode(canvas: &Canvas) -> (Vec<u8>, Vec<u8>) {
    let mut ppm = Vec::new();
    let mut bmp = Vec::new();
    canvas.write_ppm(&mut ppm).unwrap();
    canvas.write_bmp(&mut bmp).unwrap();

    (ppm, bmp)
}

#[test]
fn parallel_matches_serial() {
    let (world, camera) = small_scene();

    let parallel = parallel_render(world.clone(), camera.clone(), 4).unwrap();

    let mut serial = RenderContext::new(world, camera);
    serial.render_serial();

    assert_eq!(encode(&parallel), encode(serial.canvas()));
}

#[test]
fn rerender_is_deterministic() {
    let (world, camera) = small_scene();

    let first = parallel_render(world.clone(), camera.clone(), 3).unwrap();
    let second = parallel_render(world, camera, 5).unwrap();

    assert_eq!(encode(&first), encode(&second));
}

#[test]
fn single_thread_render() {
    let (world, camera) = small_scene();
    let canvas = parallel_render(world, camera, 1).unwrap();

    assert_eq!(canvas.pixels().len(), 64 * 48);
}

#[test]
fn zero_threads_is_an_error() {
    let (world, camera) = small_scene();
    let mut context = RenderContext::new(world, camera);

    assert!(context.render(0).is_err());
}

#[test]
fn empty_world_renders_background() {
    use crate::consts::BACKGROUND;
    use crate::vector::Vector3;

    let camera = Camera::new(16, 9, Vector3::zero());
    let canvas = parallel_render(World::empty(), camera, 2).unwrap();

    assert!(canvas.pixels().iter().all(|p| *p == BACKGROUND));
}

#[test]
fn empty_image_renders_nothing() {
    use crate::vector::Vector3;

    let camera = Camera::new(0, 0, Vector3::zero());
    let canvas = parallel_render(World::empty(), camera, 2).unwrap();

    assert!(canvas.pixels().is_empty());
}

#[test]
fn reference_scene_end_to_end() {
    use crate::scene::Scene;

    let scene = Scene::reference(800, 600);
    let canvas = parallel_render(scene.world, scene.camera, 4).unwrap();
    let (ppm, bmp) = encode(&canvas);

    let ppm = String::from_utf8(ppm).unwrap();
    assert!(ppm.starts_with("P3\n800 600\n255\n"));
    assert_eq!(ppm.split_whitespace().skip(4).count(), 800 * 600 * 3);

    let file_size = u32::from_le_bytes([bmp[2], bmp[3], bmp[4], bmp[5]]);
    assert_eq!(file_size, 54 + 3 * 800 * 600);
    assert_eq!(bmp.len(), 54 + 3 * 800 * 600);

    // The top-left pixel looks up and away from every sphere
    let corner = canvas.read_pixel(0, 0).unwrap();
    let [r, g, b] = corner.to_rgb8();
    assert!((r as i32 - 25).abs() <= 1);
    assert!((g as i32 - 25).abs() <= 1);
    assert!((b as i32 - 76).abs() <= 1);

    // The center pixel looks straight at the red sphere
    let center = canvas.read_pixel(400, 300).unwrap();
    assert!(center.r > center.g && center.r > center.b);
}

#[test]
fn failed_ppm_still_writes_bmp() {
    use crate::vector::Vector3;

    let dir = tempfile::tempdir().unwrap();
    let ppm = dir.path().join("missing").join("out.ppm");
    let bmp = dir.path().join("out.bmp");

    let mut context = RenderContext::new(World::empty(),
        Camera::new(4, 3, Vector3::zero()));
    context.render(2).unwrap();

    let (ppm_result, bmp_result) = context.save_images(&ppm, &bmp);
    assert!(ppm_result.is_err());
    assert!(bmp_result.is_ok());
    assert!(!ppm.exists());

    let contents = std::fs::read(&bmp).unwrap();
    assert_eq!(contents.len(), 54 + 3 * 4 * 3);
    assert_eq!(contents, encode(context.canvas()).1);
}

#[test]
fn failed_bmp_still_writes_ppm() {
    use crate::vector::Vector3;

    let dir = tempfile::tempdir().unwrap();
    let ppm = dir.path().join("out.ppm");
    let bmp = dir.path().join("missing").join("out.bmp");

    let mut context = RenderContext::new(World::empty(),
        Camera::new(4, 3, Vector3::zero()));
    context.render_serial();

    let (ppm_result, bmp_result) = context.save_images(&ppm, &bmp);
    assert!(ppm_result.is_ok());
    assert!(bmp_result.is_err());

    let contents = std::fs::read(&ppm).unwrap();
    assert_eq!(contents, encode(context.canvas()).0);
}
