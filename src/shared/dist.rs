use std::{
    cmp,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

/// A nautical-mile distance between two platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|d| d.0).sum())
    }
}

impl From<f64> for Distance {
    fn from(value: f64) -> Self {
        Distance(value)
    }
}

impl Distance {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_nm(nm: f64) -> Self {
        Self(nm)
    }

    pub const fn as_nm(&self) -> f64 {
        self.0
    }

    /// Minutes to cover this distance at the given speed, rounded up.
    pub fn travel_minutes(&self, speed_kn: f64) -> u32 {
        (self.0 / speed_kn * 60.0).ceil() as u32
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} NM", self.0)
    }
}

#[test]
fn travel_minutes_rounds_up() {
    // 8 NM at 18 kn is 26.66 min
    let d = Distance::from_nm(8.0);
    assert_eq!(d.travel_minutes(18.0), 27);
}

#[test]
fn travel_minutes_exact() {
    let d = Distance::from_nm(23.0);
    assert_eq!(d.travel_minutes(23.0), 60);
}

#[test]
fn distance_cmp_test() {
    let a = Distance::from_nm(3.5);
    let b = Distance::from_nm(5.0);
    assert!(a < b)
}

#[test]
fn distance_sum_test() {
    let total: Distance = [1.5, 2.0, 0.5].into_iter().map(Distance::from_nm).sum();
    assert_eq!(total, Distance::from_nm(4.0))
}
