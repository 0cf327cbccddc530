use eframe::egui;
use ndview_core::{ArraySource, EventListener, ViewerOptions};
use num::ToPrimitive;
use thiserror::Error;
use tracing::{debug, info};

use crate::window::ImageViewWindow;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Array(#[from] ndview_core::Error),
    #[error("Viewer window failed: {0}")]
    Window(#[from] eframe::Error),
}

/// A single viewer filling a native window of its own.
pub struct ViewerApp<A> {
    window: ImageViewWindow<A>,
}

impl<A> ViewerApp<A> {
    pub fn new(window: ImageViewWindow<A>) -> Self {
        Self { window }
    }
}

impl<A: ToPrimitive + Clone> eframe::App for ViewerApp<A> {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            debug!("Escape pressed, closing viewer");
            frame.close();
        }

        egui::CentralPanel::default().show(ctx, |ui| self.window.ui(ui));
    }
}

/// Runs `window` in its own native event loop, blocking until it is closed.
///
/// The event loop exists only for the duration of this call.
pub fn run_modal<A: ToPrimitive + Clone + 'static>(
    window: ImageViewWindow<A>,
) -> Result<(), ViewerError> {
    let title = window.options().title.clone();
    let (width, height) = window.options().initial_window_size;
    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(width, height)),
        ..Default::default()
    };

    info!(title = %title, "Opening viewer");
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Box::new(ViewerApp::new(window))),
    )?;
    Ok(())
}

/// Shows `source` with sliders for every leading dimension.
///
/// With `options.modal` set this blocks until the window is closed and
/// returns `None`. Otherwise the window is returned for the caller to draw
/// each frame with [`ImageViewWindow::show`] inside its own application.
///
/// # Errors
///
/// Errors if the input can't be viewed or the native window fails.
pub fn view_images<A: ToPrimitive + Clone + 'static>(
    source: impl ArraySource<A>,
    options: ViewerOptions,
    listener: Option<Box<dyn EventListener>>,
) -> Result<Option<ImageViewWindow<A>>, ViewerError> {
    let modal = options.modal;
    let mut window = ImageViewWindow::new(source, options)?;
    window.set_listener(listener);

    if modal {
        run_modal(window)?;
        Ok(None)
    } else {
        Ok(Some(window))
    }
}
