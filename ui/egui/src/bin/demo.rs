#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use ndarray::Array;
use ndarray_rand::{rand_distr::Uniform, RandomExt};
use ndview_core::{ClickEvent, Overlays, ViewerOptions};
use ndview_egui::{view_images, ViewerError};
use tracing::info;

/// Side of the square drawn around each click, in pixels of the image.
const MARK_SIZE: f32 = 10.0;

fn main() -> Result<(), ViewerError> {
    tracing_subscriber::fmt::init();

    let img = Array::random((20, 5, 200, 200), Uniform::new(0u8, 100));

    let on_click = |event: &ClickEvent, overlays: &mut Overlays| {
        info!(position = ?event.position, index = ?event.index, "Clicked");
        overlays.add_centered_square(event.position, MARK_SIZE);
    };

    view_images(
        img,
        ViewerOptions::default().title("ndview demo"),
        Some(Box::new(on_click)),
    )?;
    Ok(())
}
