use std::sync::atomic::{AtomicUsize, Ordering};

use egui::{Color32, ColorImage, Key, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use ndarray::OwnedArcRepr;
use ndview_core::{
    event::dispatch_click, render_slice, ArraySource, Error, EventListener, ImagePos, Overlay,
    Overlays, SliceNavigator, ViewerOptions,
};
use num::ToPrimitive;
use tracing::{debug, warn};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Sliders for the leading dimensions above the current slice as an image.
///
/// Draw it into any [`egui::Ui`] with [`ImageViewWindow::ui`], or as a
/// floating window of a running application with [`ImageViewWindow::show`].
pub struct ImageViewWindow<A> {
    id: egui::Id,
    navigator: SliceNavigator<OwnedArcRepr<A>>,
    options: ViewerOptions,
    overlays: Overlays,
    listener: Option<Box<dyn EventListener>>,
    texture: Option<TextureHandle>,
    /// Width and height of the displayed slice. The texture may be smaller.
    slice_size: [usize; 2],
    /// Where the image was drawn in the last frame.
    image_rect: Option<Rect>,
    dirty: bool,
    /// Leading dimension the keyboard moves.
    active_dim: usize,
    open: bool,
}

impl<A> std::fmt::Debug for ImageViewWindow<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageViewWindow")
            .field("id", &self.id)
            .field("navigator", &self.navigator)
            .field("options", &self.options)
            .field("overlays", &self.overlays.len())
            .field("has_listener", &self.listener.is_some())
            .field("open", &self.open)
            .finish()
    }
}

impl<A: ToPrimitive + Clone> ImageViewWindow<A> {
    /// # Errors
    ///
    /// Errors if the input can't be converted or has fewer than 2 dimensions.
    pub fn new(source: impl ArraySource<A>, options: ViewerOptions) -> Result<Self, Error> {
        let array = source.into_array()?.into_shared();
        let navigator = SliceNavigator::new(array)?;
        let id = egui::Id::new(("ndview", NEXT_ID.fetch_add(1, Ordering::Relaxed)));
        debug!(?navigator, title = %options.title, "Created viewer");

        Ok(Self {
            id,
            navigator,
            options,
            overlays: Overlays::default(),
            listener: None,
            texture: None,
            slice_size: [0, 0],
            image_rect: None,
            dirty: true,
            active_dim: 0,
            open: true,
        })
    }

    pub fn with_listener(mut self, listener: impl EventListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn EventListener>>) {
        self.listener = listener;
    }

    pub fn navigator(&self) -> &SliceNavigator<OwnedArcRepr<A>> {
        &self.navigator
    }

    /// Changes made through this are picked up on the next frame.
    pub fn navigator_mut(&mut self) -> &mut SliceNavigator<OwnedArcRepr<A>> {
        self.dirty = true;
        &mut self.navigator
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut Overlays {
        &mut self.overlays
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Draws the viewer as a window inside a host application.
    ///
    /// Returns `false` once the user closed it.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut open = self.open;
        let (width, height) = self.options.initial_window_size;
        egui::Window::new(self.options.title.clone())
            .id(self.id)
            .open(&mut open)
            .default_size([width, height])
            .resizable(true)
            .show(ctx, |ui| self.ui(ui));

        if self.open && !open {
            debug!(title = %self.options.title, "Viewer closed");
        }
        self.open = open;
        open
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.sliders(ui);
        self.keyboard(ui);
        ui.horizontal(|ui| {
            ui.label(self.navigator.current_index_label());
            if !self.overlays.is_empty() && ui.button("Clear marks").clicked() {
                self.overlays.clear();
            }
        });

        self.refresh_texture(ui.ctx());
        self.image(ui);
    }

    fn sliders(&mut self, ui: &mut egui::Ui) {
        let leading = self.navigator.leading_shape().to_vec();
        for (dim, extent) in leading.into_iter().enumerate() {
            let mut value = self.navigator.index()[dim];
            let response = ui.add(
                egui::Slider::new(&mut value, 0..=extent - 1)
                    .text(format!("dim {dim}"))
                    .step_by(1.0)
                    .clamp_to_range(true),
            );

            if response.has_focus() || response.dragged() {
                self.active_dim = dim;
            }
            if response.changed() {
                self.active_dim = dim;
                match self.navigator.set_index(dim, value) {
                    Ok(()) => self.dirty = true,
                    Err(err) => warn!("Ignoring slider value: {}", err),
                }
            }
        }
    }

    /// Arrow keys step the active dimension by one, page keys by a tick.
    /// Focused sliders handle their own keys.
    fn keyboard(&mut self, ui: &mut egui::Ui) {
        if self.navigator.leading_shape().is_empty() || ui.memory(|m| m.focus().is_some()) {
            return;
        }

        let tick = self.options.tick_interval.max(1) as isize;
        let delta = ui.input(|i| {
            if i.key_pressed(Key::ArrowRight) {
                1
            } else if i.key_pressed(Key::ArrowLeft) {
                -1
            } else if i.key_pressed(Key::PageUp) {
                tick
            } else if i.key_pressed(Key::PageDown) {
                -tick
            } else if i.key_pressed(Key::ArrowUp) {
                self.active_dim = self.active_dim.saturating_sub(1);
                0
            } else if i.key_pressed(Key::ArrowDown) {
                self.active_dim += 1;
                0
            } else {
                0
            }
        });
        self.active_dim = self.active_dim.min(self.navigator.leading_shape().len() - 1);

        if delta != 0 {
            match self.navigator.step(self.active_dim, delta) {
                Ok(changed) => self.dirty |= changed,
                Err(err) => warn!("Ignoring key: {}", err),
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.dirty && self.texture.is_some() {
            return;
        }

        let image = match self.navigator.current_slice() {
            Ok(slice) => render_slice(&slice, &self.options.levels, self.options.colormap),
            Err(err) => {
                warn!("Could not select slice: {}", err);
                return;
            }
        };
        self.slice_size = image.size();

        let max_side = ctx.input(|i| i.max_texture_side);
        if image.width.max(image.height) > max_side {
            debug!(size = ?image.size(), max_side, "Slice exceeds the texture limit, downsampling");
        }
        let image = image.fit_within(max_side);
        let image = ColorImage::from_rgba_unmultiplied(image.size(), &image.pixels);

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    format!("ndview-{:?}", self.id),
                    image,
                    TextureOptions::NEAREST,
                ));
            }
        }
        self.dirty = false;
    }

    fn image(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = self.texture.as_ref().map(TextureHandle::id) else {
            return;
        };

        let [width, height] = self.slice_size;
        let available = ui.available_size();
        let scale = (available.x / width as f32).min(available.y / height as f32);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        let response = ui.add(
            egui::Image::new(texture, Vec2::new(width as f32, height as f32) * scale)
                .sense(Sense::click()),
        );
        let rect = response.rect;
        self.image_rect = Some(rect);
        let to_image =
            |p: egui::Pos2| ImagePos::new((p.x - rect.min.x) / scale, (p.y - rect.min.y) / scale);

        let painter = ui.painter_at(rect);
        for overlay in self.overlays.iter() {
            match overlay {
                Overlay::Rect { min, size } => {
                    let min = rect.min + Vec2::new(min.x, min.y) * scale;
                    let size = Vec2::new(size.0, size.1) * scale;
                    painter.rect_stroke(
                        Rect::from_min_size(min, size),
                        0.0,
                        Stroke::new(1.5, Color32::YELLOW),
                    );
                }
            }
        }

        if let Some(hover) = response.hover_pos() {
            let pos = to_image(hover);
            if let Some((row, col)) = pos.pixel(height, width) {
                let value = self
                    .navigator
                    .current_slice()
                    .ok()
                    .and_then(|slice| slice[[row, col]].to_f64());
                if let Some(value) = value {
                    response
                        .clone()
                        .on_hover_text(format!("({col}, {row}) = {value}"));
                }
            }
        }

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let position = to_image(pointer);
                debug!(?position, index = ?self.navigator.index(), "Click");
                dispatch_click(
                    self.listener.as_deref_mut(),
                    position,
                    self.navigator.index(),
                    &mut self.overlays,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use egui::{Event, Modifiers, PointerButton, Pos2};
    use ndarray::{arr1, Array3, Array4};
    use ndview_core::{ClickEvent, Error};

    use super::*;

    /// Draws `window` into the central panel of a 400x400 screen.
    fn frame(ctx: &egui::Context, window: &mut ImageViewWindow<f32>, events: Vec<Event>) {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::splat(400.0))),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| window.ui(ui));
        });
    }

    fn key(key: Key) -> Event {
        Event::Key {
            key,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn run(ctx: &egui::Context, window: &mut ImageViewWindow<f32>) -> bool {
        let mut open = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            open = window.show(ctx);
        });
        open
    }

    #[test]
    fn rank_one_input_is_rejected() {
        let err = ImageViewWindow::new(arr1(&[1.0f32, 2.0]), ViewerOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { .. }));
    }

    #[test]
    fn uploads_transposed_slice() {
        let arr = Array3::from_shape_fn((4, 8, 6), |(a, b, c)| (a + b + c) as f32);
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default().modal(false)).unwrap();

        let ctx = egui::Context::default();
        assert!(run(&ctx, &mut window));

        let texture = window.texture.as_ref().unwrap();
        assert_eq!(texture.size(), [8, 6]);
        assert!(!window.dirty);
    }

    #[test]
    fn navigator_changes_mark_texture_stale() {
        let arr = Array3::<f32>::zeros((3, 2, 2));
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default()).unwrap();

        let ctx = egui::Context::default();
        run(&ctx, &mut window);
        assert!(!window.dirty);

        window.navigator_mut().set_index(0, 2).unwrap();
        assert!(window.dirty);
        assert_eq!(window.navigator().current_index_label(), "[2]");

        run(&ctx, &mut window);
        assert!(!window.dirty);
    }

    #[test]
    fn listener_can_be_attached() {
        let arr = Array3::<f32>::zeros((1, 2, 2));
        let window = ImageViewWindow::new(arr, ViewerOptions::default())
            .unwrap()
            .with_listener(|event: &ClickEvent, overlays: &mut Overlays| {
                overlays.add_centered_square(event.position, 10.0);
            });

        assert!(window.listener.is_some());
        assert!(window.overlays().is_empty());
        assert!(window.is_open());
    }

    #[test]
    fn click_is_mapped_to_image_coordinates() {
        // Displayed slice is 20 rows of 40 columns
        let arr = Array3::<f32>::zeros((2, 40, 20));
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&clicks);
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default())
            .unwrap()
            .with_listener(move |event: &ClickEvent, overlays: &mut Overlays| {
                seen.borrow_mut().push(event.clone());
                overlays.add_centered_square(event.position, 10.0);
            });

        let ctx = egui::Context::default();
        frame(&ctx, &mut window, vec![]);
        let rect = window.image_rect.unwrap();
        assert!((rect.width() / rect.height() - 2.0).abs() < 1e-3);

        let pos = rect.min + Vec2::new(rect.width() * 0.25, rect.height() * 0.5);
        frame(&ctx, &mut window, vec![Event::PointerMoved(pos)]);
        frame(&ctx, &mut window, vec![button(pos, true)]);
        frame(&ctx, &mut window, vec![button(pos, false)]);

        let clicks = clicks.borrow();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].index, vec![0]);
        assert!((clicks[0].position.x - 10.0).abs() < 0.1);
        assert!((clicks[0].position.y - 10.0).abs() < 0.1);

        assert_eq!(window.overlays().len(), 1);
        let Some(Overlay::Rect { min, size }) = window.overlays().iter().next() else {
            panic!("expected a rectangle");
        };
        assert_eq!(*size, (10.0, 10.0));
        assert!((min.x - 5.0).abs() < 0.1 && (min.y - 5.0).abs() < 0.1);
    }

    #[test]
    fn keys_step_the_active_dimension() {
        let arr = Array4::<f32>::zeros((12, 3, 2, 2));
        let mut window =
            ImageViewWindow::new(arr, ViewerOptions::default().tick_interval(10)).unwrap();
        let ctx = egui::Context::default();
        frame(&ctx, &mut window, vec![]);

        let steps: [(Key, [usize; 2]); 10] = [
            (Key::ArrowRight, [1, 0]),
            (Key::PageUp, [11, 0]),
            (Key::PageUp, [11, 0]),
            (Key::PageDown, [1, 0]),
            (Key::ArrowLeft, [0, 0]),
            (Key::ArrowLeft, [0, 0]),
            (Key::ArrowDown, [0, 0]),
            (Key::ArrowRight, [0, 1]),
            (Key::ArrowDown, [0, 1]),
            (Key::ArrowRight, [0, 2]),
        ];
        for (pressed, expected) in steps {
            frame(&ctx, &mut window, vec![key(pressed)]);
            assert_eq!(window.navigator().index(), &expected, "after {pressed:?}");
            assert!(!window.dirty);
        }

        frame(&ctx, &mut window, vec![key(Key::ArrowUp)]);
        frame(&ctx, &mut window, vec![key(Key::ArrowRight)]);
        assert_eq!(window.navigator().index(), &[1, 2]);
    }

    #[test]
    fn keys_are_ignored_while_a_widget_has_focus() {
        let arr = Array3::<f32>::zeros((5, 2, 2));
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default()).unwrap();
        let ctx = egui::Context::default();
        frame(&ctx, &mut window, vec![]);

        ctx.memory_mut(|m| m.request_focus(egui::Id::new("elsewhere")));
        frame(&ctx, &mut window, vec![key(Key::ArrowRight)]);
        assert_eq!(window.navigator().index(), &[0]);

        // Focus on a widget that was never drawn is dropped after one frame
        frame(&ctx, &mut window, vec![key(Key::ArrowRight)]);
        assert_eq!(window.navigator().index(), &[1]);
    }

    #[test]
    fn focused_slider_sets_index() {
        let arr = Array4::<f32>::zeros((5, 4, 2, 2));
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default()).unwrap();
        let ctx = egui::Context::default();
        frame(&ctx, &mut window, vec![]);

        // Tab focuses the first slider, which then takes the arrow keys itself
        frame(&ctx, &mut window, vec![key(Key::Tab)]);
        frame(&ctx, &mut window, vec![key(Key::ArrowRight)]);
        assert_eq!(window.navigator().index(), &[1, 0]);
        assert_eq!(window.active_dim, 0);
        assert!(!window.dirty);

        // Without focus the keyboard moves the slider used last
        frame(&ctx, &mut window, vec![key(Key::Escape)]);
        frame(&ctx, &mut window, vec![key(Key::ArrowRight)]);
        assert_eq!(window.navigator().index(), &[2, 0]);
    }

    #[test]
    fn large_slices_are_downsampled_for_the_texture() {
        let arr = Array3::<f32>::zeros((1, 10, 6));
        let mut window = ImageViewWindow::new(arr, ViewerOptions::default()).unwrap();

        let ctx = egui::Context::default();
        let input = egui::RawInput {
            max_texture_side: Some(4),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| window.ui(ui));
        });

        assert_eq!(window.slice_size, [10, 6]);
        assert_eq!(window.texture.as_ref().unwrap().size(), [4, 2]);
    }
}
