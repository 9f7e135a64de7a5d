use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };
use std::sync::atomic::{ AtomicBool, Ordering };

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::renderer::Renderer;

pub enum Message {
    Row(usize),
    Terminate,
}

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(renderer: Arc<Renderer>, buffer: Arc<Mutex<PixelBuffer>>,
        dims: (usize, usize), receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        cancelled: Arc<AtomicBool>) -> Worker {
        let (width, height) = dims;

        let thread = thread::spawn(move || loop {
            // Obtain the message being executed.
            let message: Message = receiver.lock().unwrap().recv().unwrap();

            match message {
                Message::Row(py) => {
                    // Cancellation is checked between row batches; rows
                    // already in flight finish normally.
                    if cancelled.load(Ordering::Relaxed) {
                        continue;
                    }

                    // Render a full row locally, then publish it with a
                    // single buffer lock. Pixel evaluation only reads
                    // immutable scene state.
                    let y = -2.0 * (py as f64 / height as f64) + 1.0;
                    let mut row: Vec<Color> = Vec::with_capacity(width);
                    for px in 0..width {
                        let x = 2.0 * (px as f64 / width as f64) - 1.0;
                        row.push(renderer.color_pixel(x, y));
                    }

                    let mut img = buffer.lock().unwrap();
                    for (px, color) in row.iter().enumerate() {
                        img.set_color(px, py, color);
                    }
                },

                Message::Terminate => {
                    // Exit the worker thread loop, terminating the thread.
                    break;
                }
            }
        });

        Worker { thread: Some(thread) }
    }
}

/// A pool of render workers consuming row messages.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
    cancelled: Arc<AtomicBool>,
}

impl ThreadPool {
    pub fn new(size: usize, renderer: Arc<Renderer>,
        buffer: Arc<Mutex<PixelBuffer>>, dims: (usize, usize)) -> ThreadPool {
        // There should be at least one thread to run workers.
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size);
        for _ in 0..size {
            workers.push(Worker::new(
                Arc::clone(&renderer),
                Arc::clone(&buffer),
                dims,
                Arc::clone(&receiver),
                Arc::clone(&cancelled),
            ));
        }

        ThreadPool { workers, sender, cancelled }
    }

    pub fn execute(&self, message: Message) {
        self.sender.send(message).unwrap();
    }

    /// Asks the workers to skip any rows they have not started yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            self.sender.send(Message::Terminate).unwrap();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                thread.join().unwrap();
            }
        }
    }
}

/// Renders the scene across `threads` workers, one row per message.
///
/// Produces the same image as `Renderer::render`; pixels depend only on
/// immutable scene state, so partitioning by row needs no coordination
/// beyond the buffer mutex.
pub fn parallel_render(renderer: &Arc<Renderer>, width: usize, height: usize,
    threads: usize) -> PixelBuffer {
    let buffer = Arc::new(Mutex::new(PixelBuffer::new(width, height)));

    {
        let pool = ThreadPool::new(
            threads,
            Arc::clone(renderer),
            Arc::clone(&buffer),
            (width, height),
        );

        for py in 0..height {
            pool.execute(Message::Row(py));
        }

        // Dropping the pool joins the workers after they drain the queue.
    }

    match Arc::try_unwrap(buffer) {
        Ok(mutex) => mutex.into_inner().unwrap(),
        Err(_) => unreachable!("worker threads have been joined"),
    }
}

/* Tests */
