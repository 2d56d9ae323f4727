//! Visible region selection for the overlay.

use tile_editor_core::{TileBounds, TileCoord};

/// Which inputs shaped the most recent overlay region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayState {
    /// Nothing painted and no hover; no region.
    Empty,
    /// Nothing painted; the region surrounds the hover tile.
    HoverOnly,
    /// Painted terrain, with the hover (if any) inside the buffered bounds.
    Painted,
    /// Painted terrain extended to reach a hover outside the buffered bounds.
    PaintedWithHover,
}

/// Classifies the overlay inputs.
#[must_use]
pub fn overlay_state(
    painted: Option<TileBounds>,
    hover: Option<TileCoord>,
    buffer: i32,
) -> OverlayState {
    match (painted, hover) {
        (None, None) => OverlayState::Empty,
        (None, Some(_)) => OverlayState::HoverOnly,
        (Some(_), None) => OverlayState::Painted,
        (Some(bounds), Some(hover)) => {
            if bounds.expand(buffer).contains(hover) {
                OverlayState::Painted
            } else {
                OverlayState::PaintedWithHover
            }
        }
    }
}

/// Region of tiles the overlay should cover.
///
/// Painted bounds are padded by `buffer` tiles. A hover outside the padded
/// bounds extends the region to the bounding rectangle of both areas; with
/// nothing painted, the region is the hover tile padded by `buffer`.
#[must_use]
pub fn calculate_region(
    painted: Option<TileBounds>,
    hover: Option<TileCoord>,
    buffer: i32,
) -> Option<TileBounds> {
    match (painted, hover) {
        (None, None) => None,
        (None, Some(hover)) => Some(TileBounds::around(hover, buffer)),
        (Some(bounds), None) => Some(bounds.expand(buffer)),
        (Some(bounds), Some(hover)) => {
            let expanded = bounds.expand(buffer);
            if expanded.contains(hover) {
                Some(expanded)
            } else {
                Some(expanded.union(TileBounds::around(hover, buffer)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_painted_and_no_hover_has_no_region() {
        assert_eq!(calculate_region(None, None, 2), None);
        assert_eq!(overlay_state(None, None, 2), OverlayState::Empty);
    }

    #[test]
    fn hover_only_region_surrounds_hover() {
        let region = calculate_region(None, Some(TileCoord::new(5, 10)), 2);
        assert_eq!(region, Some(TileBounds::new(3, 7, 8, 12)));
        assert_eq!(
            overlay_state(None, Some(TileCoord::new(5, 10)), 2),
            OverlayState::HoverOnly
        );
    }

    #[test]
    fn painted_region_is_buffered_bounds() {
        let painted = Some(TileBounds::new(0, 5, 0, 5));
        assert_eq!(
            calculate_region(painted, None, 2),
            Some(TileBounds::new(-2, 7, -2, 7))
        );
    }

    #[test]
    fn hover_inside_buffer_does_not_extend_region() {
        let painted = Some(TileBounds::new(0, 5, 0, 5));
        let hover = Some(TileCoord::new(7, -2));

        assert_eq!(
            calculate_region(painted, hover, 2),
            Some(TileBounds::new(-2, 7, -2, 7))
        );
        assert_eq!(overlay_state(painted, hover, 2), OverlayState::Painted);
    }

    #[test]
    fn hover_outside_buffer_extends_region() {
        let painted = Some(TileBounds::new(0, 5, 0, 5));
        let hover = Some(TileCoord::new(12, 3));

        assert_eq!(
            calculate_region(painted, hover, 2),
            Some(TileBounds::new(-2, 14, -2, 7))
        );
        assert_eq!(
            overlay_state(painted, hover, 2),
            OverlayState::PaintedWithHover
        );
    }
}
