use std::{
    fmt,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use rand::{
    distributions::uniform::{SampleBorrow, SampleUniform, UniformInt, UniformSampler},
    Rng,
};

use serde::{Serialize, Serializer};

/// The (finite) cost of travelling along an edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cost(i64);

impl Cost {
    pub fn new(cost: i64) -> Self {
        Cost(cost)
    }

    pub fn zero() -> Self {
        Cost(0)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Add for Cost {
    type Output = Self;
    fn add(self, rhs: Cost) -> Self::Output {
        Cost(self.0 + rhs.0)
    }
}

impl Sub for Cost {
    type Output = Self;
    fn sub(self, rhs: Cost) -> Self::Output {
        Cost(self.0 - rhs.0)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        *self = Cost(self.0 + rhs.0)
    }
}

impl Sum<Cost> for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Self {
        iter.fold(Cost::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Cost> for Cost {
    fn sum<I: Iterator<Item = &'a Cost>>(iter: I) -> Self {
        iter.fold(Cost::zero(), |a, b| a + *b)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Cost {
    fn from(cost: i64) -> Self {
        Cost::new(cost)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct UniformCost(UniformInt<i64>);

impl UniformSampler for UniformCost {
    type X = Cost;
    fn new<B1, B2>(low: B1, high: B2) -> Self
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        UniformCost(UniformInt::<i64>::new(low.borrow().0, high.borrow().0))
    }
    fn new_inclusive<B1, B2>(low: B1, high: B2) -> Self
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        UniformCost(UniformInt::<i64>::new_inclusive(
            low.borrow().0,
            high.borrow().0,
        ))
    }
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::X {
        Cost::new(self.0.sample(rng))
    }
}

impl SampleUniform for Cost {
    type Sampler = UniformCost;
}

/// A cell of a cost matrix: either a finite cost or a forbidden edge.
///
/// `Forbidden` is absorbing: subtracting a finite cost from it or adding
/// anything to it yields `Forbidden` again. It orders above every finite
/// weight, so minima over a line ignore it unless the line is entirely
/// forbidden.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weight {
    Finite(Cost),
    Forbidden,
}

impl Weight {
    pub fn finite(cost: i64) -> Self {
        Weight::Finite(Cost::new(cost))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Weight::Forbidden)
    }

    pub fn is_finite(&self) -> bool {
        !self.is_forbidden()
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Weight::Finite(c) if c.get() == 0)
    }

    pub fn cost(&self) -> Option<Cost> {
        match self {
            Weight::Finite(cost) => Some(*cost),
            Weight::Forbidden => None,
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Forbidden
    }
}

impl From<Cost> for Weight {
    fn from(cost: Cost) -> Self {
        Weight::Finite(cost)
    }
}

impl From<Option<Cost>> for Weight {
    fn from(cost: Option<Cost>) -> Self {
        cost.map_or(Weight::Forbidden, Weight::Finite)
    }
}

impl Add for Weight {
    type Output = Self;
    fn add(self, rhs: Weight) -> Self::Output {
        match (self, rhs) {
            (Weight::Finite(a), Weight::Finite(b)) => Weight::Finite(a + b),
            _ => Weight::Forbidden,
        }
    }
}

impl Add<Cost> for Weight {
    type Output = Self;
    fn add(self, rhs: Cost) -> Self::Output {
        self + Weight::Finite(rhs)
    }
}

impl Sub<Cost> for Weight {
    type Output = Self;
    fn sub(self, rhs: Cost) -> Self::Output {
        match self {
            Weight::Finite(a) => Weight::Finite(a - rhs),
            Weight::Forbidden => Weight::Forbidden,
        }
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Finite(cost) => write!(f, "{}", cost),
            Weight::Forbidden => write!(f, "∞"),
        }
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Weight::Finite(cost) => serializer.serialize_some(&cost.get()),
            Weight::Forbidden => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod test_cost {
    use super::*;

    #[test]
    fn test_forbidden_is_absorbing() {
        assert_eq!(Weight::Forbidden - Cost::new(5), Weight::Forbidden);
        assert_eq!(Weight::Forbidden + Weight::finite(3), Weight::Forbidden);
        assert_eq!(Weight::finite(3) + Weight::Forbidden, Weight::Forbidden);
        assert_eq!(Weight::finite(7) - Cost::new(5), Weight::finite(2));
        assert_eq!(Weight::finite(7) + Cost::new(5), Weight::finite(12));
    }

    #[test]
    fn test_forbidden_orders_last() {
        assert!(Weight::finite(i64::MAX) < Weight::Forbidden);
        assert!(Weight::finite(-3) < Weight::finite(0));
        let weights = vec![Weight::Forbidden, Weight::finite(4), Weight::finite(2)];
        assert_eq!(weights.iter().min(), Some(&Weight::finite(2)));
        assert_eq!(
            vec![Weight::Forbidden, Weight::Forbidden].iter().min(),
            Some(&Weight::Forbidden)
        );
    }

    #[test]
    fn test_cost_sum() {
        let costs: Vec<Cost> = vec![1.into(), 2.into(), 3.into()];
        assert_eq!(costs.iter().sum::<Cost>(), 6.into());
        assert_eq!(Weight::from(None), Weight::Forbidden);
        assert_eq!(Weight::from(Some(Cost::new(4))).cost(), Some(4.into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Weight::Forbidden.to_string(), "∞");
        assert_eq!(Weight::finite(12).to_string(), "12");
    }
}
