use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// A point on the displayed image, `x` along columns and `y` along rows.
#[derive(Constructor, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePos {
    pub x: f32,
    pub y: f32,
}

impl ImagePos {
    /// Element of the displayed slice under this point, as `(row, column)`.
    pub fn pixel(&self, rows: usize, cols: usize) -> Option<(usize, usize)> {
        if self.x < 0.0 || self.y < 0.0 {
            return None;
        }
        let (row, col) = (self.y.floor() as usize, self.x.floor() as usize);
        (row < rows && col < cols).then_some((row, col))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub kind: EventKind,
    pub position: ImagePos,
    /// Index vector of the slice that was clicked.
    pub index: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Overlay {
    Rect { min: ImagePos, size: (f32, f32) },
}

/// Shapes drawn on top of the image, in image coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlays {
    items: Vec<Overlay>,
}

impl Overlays {
    pub fn add(&mut self, overlay: Overlay) {
        self.items.push(overlay);
    }

    pub fn add_rect(&mut self, min: ImagePos, size: (f32, f32)) {
        self.add(Overlay::Rect { min, size });
    }

    /// Square of side `side` centred on `center`.
    pub fn add_centered_square(&mut self, center: ImagePos, side: f32) {
        let min = ImagePos::new(center.x - side / 2.0, center.y - side / 2.0);
        self.add_rect(min, (side, side));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> + '_ {
        self.items.iter()
    }
}

/// Receives events from the display surface.
///
/// Any `FnMut(&ClickEvent, &mut Overlays)` closure is a listener.
pub trait EventListener {
    fn on_click(&mut self, event: &ClickEvent, overlays: &mut Overlays);
}

impl<F: FnMut(&ClickEvent, &mut Overlays)> EventListener for F {
    fn on_click(&mut self, event: &ClickEvent, overlays: &mut Overlays) {
        self(event, overlays)
    }
}

/// Hands a click on `position` to `listener` unchanged.
pub fn dispatch_click<L: EventListener + ?Sized>(
    listener: Option<&mut L>,
    position: ImagePos,
    index: &[usize],
    overlays: &mut Overlays,
) -> Option<ClickEvent> {
    let listener = listener?;
    let event = ClickEvent {
        kind: EventKind::Click,
        position,
        index: index.to_vec(),
    };
    listener.on_click(&event, overlays);
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_reaches_listener_unchanged() {
        let mut seen = Vec::new();
        let mut overlays = Overlays::default();
        let mut listener = |event: &ClickEvent, overlays: &mut Overlays| {
            seen.push(event.clone());
            overlays.add_centered_square(event.position, 10.0);
        };

        let pos = ImagePos::new(12.25, 40.5);
        let event = dispatch_click(Some(&mut listener), pos, &[3, 1], &mut overlays).unwrap();

        assert_eq!(event.position, pos);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::Click);
        assert_eq!(seen[0].index, vec![3, 1]);
        assert_eq!(
            overlays.iter().next(),
            Some(&Overlay::Rect {
                min: ImagePos::new(7.25, 35.5),
                size: (10.0, 10.0)
            })
        );
    }

    #[test]
    fn no_listener_no_event() {
        let mut overlays = Overlays::default();
        let event = dispatch_click::<dyn EventListener>(
            None,
            ImagePos::new(1.0, 1.0),
            &[],
            &mut overlays,
        );
        assert!(event.is_none());
        assert!(overlays.is_empty());
    }

    #[test]
    fn pixel_under_position() {
        assert_eq!(ImagePos::new(2.7, 0.1).pixel(3, 4), Some((0, 2)));
        assert_eq!(ImagePos::new(4.0, 0.0).pixel(3, 4), None);
        assert_eq!(ImagePos::new(-0.5, 1.0).pixel(3, 4), None);
    }
}
