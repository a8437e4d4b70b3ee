/// Integer rectangle for viewports and scissors, in backbuffer pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// All fields zero: "use the whole backbuffer".
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0 && self.width == 0 && self.height == 0
    }

    /// Nothing would be drawn inside this rect.
    #[inline]
    pub const fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vs_zero_area() {
        assert!(Rect::ZERO.is_zero());
        assert!(Rect::ZERO.is_zero_area());

        let offset = Rect::new(10, 0, 0, 0);
        assert!(!offset.is_zero());
        assert!(offset.is_zero_area());

        let thin = Rect::new(0, 0, 640, 0);
        assert!(thin.is_zero_area());
        assert!(!Rect::new(0, 0, 1, 1).is_zero_area());
    }

    #[test]
    fn negative_origin_is_not_zero() {
        assert!(!Rect::new(-1, 1, 0, 0).is_zero());
    }
}
