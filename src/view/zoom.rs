use std::fmt;
use std::time::{Duration, Instant};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
pub const ZOOM_FACTOR: f64 = 1.5;
pub const RESET_DURATION: Duration = Duration::from_millis(750);
pub const STEP_DURATION: Duration = Duration::from_millis(200);
pub const NAVIGATE_DURATION: Duration = Duration::from_millis(500);

/// Pan/zoom transform: screen = world * k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self {
            k: k.clamp(MIN_SCALE, MAX_SCALE),
            x,
            y,
        }
    }

    pub fn apply(&self, (px, py): (f64, f64)) -> (f64, f64) {
        (px * self.k + self.x, py * self.k + self.y)
    }

    pub fn invert(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// Scale by `factor` keeping the screen point `anchor` fixed.
    pub fn scaled_about(&self, factor: f64, anchor: (f64, f64)) -> Self {
        let k = (self.k * factor).clamp(MIN_SCALE, MAX_SCALE);
        let (wx, wy) = self.invert(anchor);
        Self {
            k,
            x: anchor.0 - wx * k,
            y: anchor.1 - wy * k,
        }
    }

    /// Same scale, translated so world point `target` lands on `screen`.
    pub fn centered_on(&self, target: (f64, f64), screen: (f64, f64)) -> Self {
        Self {
            k: self.k,
            x: screen.0 - target.0 * self.k,
            y: screen.1 - target.1 * self.k,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            k: self.k + (other.k - self.k) * t,
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ZoomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone)]
struct Transition {
    from: ZoomTransform,
    to: ZoomTransform,
    start: Instant,
    duration: Duration,
}

/// Current transform plus an optional in-flight animated transition.
#[derive(Debug, Clone, Default)]
pub struct Zoom {
    transform: ZoomTransform,
    transition: Option<Transition>,
}

impl Zoom {
    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Final transform once any running transition completes.
    pub fn target(&self) -> ZoomTransform {
        self.transition
            .as_ref()
            .map(|t| t.to)
            .unwrap_or(self.transform)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Jump immediately (wheel or pan gesture). Interrupts any transition.
    pub fn set(&mut self, transform: ZoomTransform) {
        self.transition = None;
        self.transform = ZoomTransform::new(transform.k, transform.x, transform.y);
    }

    pub fn animate_to(&mut self, to: ZoomTransform, now: Instant, duration: Duration) {
        self.transition = Some(Transition {
            from: self.transform,
            to: ZoomTransform::new(to.k, to.x, to.y),
            start: now,
            duration,
        });
    }

    pub fn reset(&mut self, now: Instant) {
        self.animate_to(ZoomTransform::IDENTITY, now, RESET_DURATION);
    }

    pub fn scale_by(&mut self, factor: f64, anchor: (f64, f64), now: Instant) {
        let to = self.target().scaled_about(factor, anchor);
        self.animate_to(to, now, STEP_DURATION);
    }

    pub fn center_on(&mut self, target: (f64, f64), screen: (f64, f64), now: Instant) {
        let to = self.target().centered_on(target, screen);
        self.animate_to(to, now, NAVIGATE_DURATION);
    }

    /// Step the running transition to `now`. Returns true if the transform changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };
        let elapsed = now.saturating_duration_since(transition.start);
        let t = if transition.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / transition.duration.as_secs_f64()
        };
        if t >= 1.0 {
            self.transform = transition.to;
            self.transition = None;
        } else {
            self.transform = transition.from.lerp(&transition.to, ease_cubic_in_out(t));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_clamped() {
        let t = ZoomTransform::IDENTITY.scaled_about(100.0, (0.0, 0.0));
        assert_eq!(t.k, MAX_SCALE);
        let t = ZoomTransform::IDENTITY.scaled_about(0.0001, (0.0, 0.0));
        assert_eq!(t.k, MIN_SCALE);
        assert_eq!(ZoomTransform::new(50.0, 0.0, 0.0).k, MAX_SCALE);
    }

    #[test]
    fn test_scale_keeps_anchor_fixed() {
        let t = ZoomTransform::new(2.0, 10.0, 20.0);
        let anchor = (300.0, 200.0);
        let world = t.invert(anchor);
        let scaled = t.scaled_about(ZOOM_FACTOR, anchor);
        let back = scaled.apply(world);
        assert!((back.0 - anchor.0).abs() < 1e-9);
        assert!((back.1 - anchor.1).abs() < 1e-9);
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn test_reset_animates_over_750ms() {
        let start = Instant::now();
        let mut zoom = Zoom::default();
        zoom.set(ZoomTransform::new(4.0, 100.0, 50.0));
        zoom.reset(start);

        assert!(zoom.advance(start + Duration::from_millis(375)));
        let mid = zoom.transform();
        assert!((mid.k - 2.5).abs() < 1e-9);
        assert!(zoom.is_animating());

        zoom.advance(start + Duration::from_millis(750));
        assert_eq!(zoom.transform(), ZoomTransform::IDENTITY);
        assert!(!zoom.is_animating());
        assert!(!zoom.advance(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_consecutive_zoom_steps_compound() {
        let start = Instant::now();
        let mut zoom = Zoom::default();
        zoom.scale_by(ZOOM_FACTOR, (600.0, 400.0), start);
        zoom.scale_by(ZOOM_FACTOR, (600.0, 400.0), start);
        zoom.advance(start + STEP_DURATION);
        assert!((zoom.transform().k - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_center_on_keeps_scale() {
        let start = Instant::now();
        let mut zoom = Zoom::default();
        zoom.set(ZoomTransform::new(2.0, 0.0, 0.0));
        zoom.center_on((100.0, 50.0), (600.0, 400.0), start);
        zoom.advance(start + NAVIGATE_DURATION);
        let t = zoom.transform();
        assert_eq!(t.k, 2.0);
        assert_eq!(t.apply((100.0, 50.0)), (600.0, 400.0));
    }

    #[test]
    fn test_display_as_svg_transform() {
        assert_eq!(
            ZoomTransform::new(1.5, 10.0, -5.0).to_string(),
            "translate(10,-5) scale(1.5)"
        );
    }
}
