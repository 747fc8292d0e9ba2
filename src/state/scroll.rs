//! Infinite-scroll trigger

/// Whether the viewport is close enough to the end of the content to ask
/// for the next page
///
/// `threshold` is measured in viewport heights: 1.0 fires once the
/// remaining content below the viewport is at most one screen tall.
pub fn should_load_more(
    offset_y: f32,
    viewport_height: f32,
    content_height: f32,
    threshold: f32,
) -> bool {
    if viewport_height <= 0.0 {
        return false;
    }
    let remaining = content_height - (offset_y + viewport_height);
    remaining <= threshold * viewport_height
}

/// Fires "load more" at most once per content height
///
/// Scroll events keep arriving while the viewport sits near the end. The
/// trigger stays latched until the content grows (a page landed) or the
/// feed is refreshed.
#[derive(Debug, Clone, Default)]
pub struct ScrollTrigger {
    fired_at_height: Option<f32>,
}

impl ScrollTrigger {
    /// Returns true when a new "load more" should be issued
    pub fn check(
        &mut self,
        offset_y: f32,
        viewport_height: f32,
        content_height: f32,
        threshold: f32,
    ) -> bool {
        if !should_load_more(offset_y, viewport_height, content_height, threshold) {
            return false;
        }
        if self.fired_at_height == Some(content_height) {
            return false;
        }
        self.fired_at_height = Some(content_height);
        true
    }

    /// Re-arm after a refresh
    pub fn reset(&mut self) {
        self.fired_at_height = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_within_one_viewport_of_end() {
        // 3000px of content, 600px viewport, scrolled to 1900 -> 500 left
        assert!(should_load_more(1900.0, 600.0, 3000.0, 1.0));
    }

    #[test]
    fn test_does_not_fire_near_top() {
        assert!(!should_load_more(0.0, 600.0, 3000.0, 1.0));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // exactly one viewport remaining
        assert!(should_load_more(1800.0, 600.0, 3000.0, 1.0));
        assert!(!should_load_more(1799.0, 600.0, 3000.0, 1.0));
    }

    #[test]
    fn test_short_content_always_fires() {
        assert!(should_load_more(0.0, 600.0, 400.0, 1.0));
    }

    #[test]
    fn test_threshold_scales_trigger_distance() {
        assert!(!should_load_more(1000.0, 600.0, 3000.0, 1.0));
        assert!(should_load_more(1000.0, 600.0, 3000.0, 2.5));
    }

    #[test]
    fn test_trigger_fires_once_per_content_height() {
        let mut trigger = ScrollTrigger::default();

        assert!(trigger.check(1900.0, 600.0, 3000.0, 1.0));
        assert!(!trigger.check(1950.0, 600.0, 3000.0, 1.0));
        assert!(!trigger.check(2400.0, 600.0, 3000.0, 1.0));

        // next page grew the content
        assert!(trigger.check(3900.0, 600.0, 5000.0, 1.0));
    }

    #[test]
    fn test_trigger_ignores_events_far_from_end() {
        let mut trigger = ScrollTrigger::default();
        assert!(!trigger.check(0.0, 600.0, 3000.0, 1.0));
        // not latched by a miss
        assert!(trigger.check(2000.0, 600.0, 3000.0, 1.0));
    }

    #[test]
    fn test_trigger_rearms_after_reset() {
        let mut trigger = ScrollTrigger::default();
        assert!(trigger.check(1900.0, 600.0, 3000.0, 1.0));

        trigger.reset();

        assert!(trigger.check(1900.0, 600.0, 3000.0, 1.0));
    }

    #[test]
    fn test_zero_viewport_never_fires() {
        assert!(!should_load_more(0.0, 0.0, 100.0, 1.0));
    }
}
