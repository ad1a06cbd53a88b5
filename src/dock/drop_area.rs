use egui::{Pos2, Rect};

use super::types::Orientation;

/// Where a dropped content should land relative to a section, or to the whole container for the
/// `Outer*` variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropArea {
    Top,
    Right,
    Bottom,
    Left,
    Center,
    OuterTop,
    OuterRight,
    OuterBottom,
    OuterLeft,
}

impl DropArea {
    pub const OUTER: [Self; 4] = [
        Self::OuterTop,
        Self::OuterRight,
        Self::OuterBottom,
        Self::OuterLeft,
    ];

    pub fn is_outer(self) -> bool {
        matches!(
            self,
            Self::OuterTop | Self::OuterRight | Self::OuterBottom | Self::OuterLeft
        )
    }

    /// The section-relative edge this area names, ignoring whether it is an outer area.
    pub fn edge(self) -> Option<Self> {
        match self {
            Self::Top | Self::OuterTop => Some(Self::Top),
            Self::Right | Self::OuterRight => Some(Self::Right),
            Self::Bottom | Self::OuterBottom => Some(Self::Bottom),
            Self::Left | Self::OuterLeft => Some(Self::Left),
            Self::Center => None,
        }
    }

    /// The split axis and whether the new node goes before (`true`) the existing one.
    ///
    /// `None` for [`Self::Center`].
    pub fn split(self) -> Option<(Orientation, bool)> {
        match self.edge()? {
            Self::Top => Some((Orientation::Vertical, true)),
            Self::Bottom => Some((Orientation::Vertical, false)),
            Self::Left => Some((Orientation::Horizontal, true)),
            _ => Some((Orientation::Horizontal, false)),
        }
    }
}

/// The band along one container edge that accepts an outer drop.
///
/// `band_fraction` is the share of the container's height (top/bottom) or width (left/right).
/// Returns `None` for non-outer areas.
pub fn outer_drop_rect(container: Rect, area: DropArea, band_fraction: f32) -> Option<Rect> {
    let band_fraction = band_fraction.clamp(0.0, 0.5);
    let h = container.height() * band_fraction;
    let w = container.width() * band_fraction;
    let rect = match area {
        DropArea::OuterTop => Rect::from_min_max(
            container.min,
            Pos2::new(container.right(), container.top() + h),
        ),
        DropArea::OuterRight => Rect::from_min_max(
            Pos2::new(container.right() - w, container.top()),
            container.max,
        ),
        DropArea::OuterBottom => Rect::from_min_max(
            Pos2::new(container.left(), container.bottom() - h),
            container.max,
        ),
        DropArea::OuterLeft => Rect::from_min_max(
            container.min,
            Pos2::new(container.left() + w, container.bottom()),
        ),
        _ => return None,
    };
    Some(rect)
}

/// Which outer band (if any) `pointer` is in. Corners resolve to the closer edge.
pub fn outer_drop_area_at(container: Rect, pointer: Pos2, band_fraction: f32) -> Option<DropArea> {
    if !container.contains(pointer) {
        return None;
    }

    DropArea::OUTER
        .into_iter()
        .filter_map(|area| {
            let rect = outer_drop_rect(container, area, band_fraction)?;
            rect.contains(pointer)
                .then(|| (area, edge_distance(container, area, pointer)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(area, _)| area)
}

/// Classify a pointer inside a section into one of its five drop areas.
///
/// The middle third of the section (on both axes) is [`DropArea::Center`]; elsewhere the closest
/// edge wins, relative to the section's size so that wide and tall sections behave alike.
pub fn section_drop_area_at(section: Rect, pointer: Pos2) -> Option<DropArea> {
    if !section.contains(pointer) || !section.is_positive() {
        return None;
    }

    let u = (pointer.x - section.left()) / section.width();
    let v = (pointer.y - section.top()) / section.height();

    let third = 1.0 / 3.0;
    if (third..=2.0 * third).contains(&u) && (third..=2.0 * third).contains(&v) {
        return Some(DropArea::Center);
    }

    [
        (DropArea::Left, u),
        (DropArea::Right, 1.0 - u),
        (DropArea::Top, v),
        (DropArea::Bottom, 1.0 - v),
    ]
    .into_iter()
    .min_by(|a, b| a.1.total_cmp(&b.1))
    .map(|(area, _)| area)
}

fn edge_distance(container: Rect, area: DropArea, pointer: Pos2) -> f32 {
    match area {
        DropArea::OuterTop => pointer.y - container.top(),
        DropArea::OuterRight => container.right() - pointer.x,
        DropArea::OuterBottom => container.bottom() - pointer.y,
        DropArea::OuterLeft => pointer.x - container.left(),
        _ => f32::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn container() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 800.0))
    }

    #[test]
    fn split_axis_and_order() {
        assert_eq!(DropArea::Top.split(), Some((Orientation::Vertical, true)));
        assert_eq!(DropArea::OuterBottom.split(), Some((Orientation::Vertical, false)));
        assert_eq!(DropArea::Left.split(), Some((Orientation::Horizontal, true)));
        assert_eq!(DropArea::OuterRight.split(), Some((Orientation::Horizontal, false)));
        assert_eq!(DropArea::Center.split(), None);
        assert!(DropArea::OuterLeft.is_outer());
        assert!(!DropArea::Left.is_outer());
    }

    #[test]
    fn outer_rects_are_edge_bands() {
        let top = outer_drop_rect(container(), DropArea::OuterTop, 0.25).unwrap();
        assert_eq!(top, Rect::from_min_max(Pos2::ZERO, Pos2::new(1000.0, 200.0)));

        let right = outer_drop_rect(container(), DropArea::OuterRight, 0.25).unwrap();
        assert_eq!(right, Rect::from_min_max(Pos2::new(750.0, 0.0), Pos2::new(1000.0, 800.0)));

        assert!(outer_drop_rect(container(), DropArea::Center, 0.25).is_none());
    }

    #[test]
    fn outer_area_hit_testing() {
        let c = container();
        assert_eq!(outer_drop_area_at(c, Pos2::new(500.0, 10.0), 0.05), Some(DropArea::OuterTop));
        assert_eq!(outer_drop_area_at(c, Pos2::new(5.0, 400.0), 0.05), Some(DropArea::OuterLeft));
        assert_eq!(
            outer_drop_area_at(c, Pos2::new(500.0, 790.0), 0.05),
            Some(DropArea::OuterBottom)
        );
        assert_eq!(outer_drop_area_at(c, Pos2::new(500.0, 400.0), 0.05), None);
        assert_eq!(outer_drop_area_at(c, Pos2::new(-5.0, 400.0), 0.05), None);

        // Top-left corner, closer to the left edge.
        assert_eq!(outer_drop_area_at(c, Pos2::new(2.0, 20.0), 0.05), Some(DropArea::OuterLeft));
    }

    #[test]
    fn section_area_hit_testing() {
        let s = Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(300.0, 300.0));
        assert_eq!(section_drop_area_at(s, Pos2::new(250.0, 250.0)), Some(DropArea::Center));
        assert_eq!(section_drop_area_at(s, Pos2::new(110.0, 250.0)), Some(DropArea::Left));
        assert_eq!(section_drop_area_at(s, Pos2::new(390.0, 250.0)), Some(DropArea::Right));
        assert_eq!(section_drop_area_at(s, Pos2::new(250.0, 105.0)), Some(DropArea::Top));
        assert_eq!(section_drop_area_at(s, Pos2::new(250.0, 395.0)), Some(DropArea::Bottom));
        assert_eq!(section_drop_area_at(s, Pos2::new(50.0, 50.0)), None);
    }
}
