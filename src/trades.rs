//! Pagination and totals of repeating sale line items.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::error::EvalError;
use crate::input::{Category, HoldingPeriod, Trade};
use crate::value::round_to;

/// Money columns of a sale line, or the totals of several lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Amounts {
    pub proceeds: f64,
    pub cost: f64,
    pub adjustment: f64,
    pub gain: f64,
}

impl AddAssign for Amounts {
    fn add_assign(&mut self, rhs: Self) {
        self.proceeds = round_to(self.proceeds + rhs.proceeds, 2);
        self.cost = round_to(self.cost + rhs.cost, 2);
        self.adjustment = round_to(self.adjustment + rhs.adjustment, 2);
        self.gain = round_to(self.gain + rhs.gain, 2);
    }
}

/// Anything that can be listed on a sales page.
pub trait LineItem {
    fn holding_period(&self) -> HoldingPeriod;
    fn category(&self) -> Category;
    /// Amounts rounded to cents, with the gain computed from the rounded values.
    fn amounts(&self) -> Amounts;
}

impl LineItem for Trade {
    fn holding_period(&self) -> HoldingPeriod {
        self.holding_period
    }

    fn category(&self) -> Category {
        self.reporting_category
    }

    fn amounts(&self) -> Amounts {
        let proceeds = round_to(self.proceeds, 2);
        let cost = round_to(self.cost, 2);
        let adjustment = round_to(self.wash_sale_adjustment.unwrap_or(0.0), 2);
        Amounts {
            proceeds,
            cost,
            adjustment,
            gain: round_to(proceeds - cost + adjustment, 2),
        }
    }
}

/// One page of a sales form: a single category, up to `capacity` items per
/// holding period.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub category: Category,
    pub short: Vec<&'a T>,
    pub long: Vec<&'a T>,
    pub short_totals: Amounts,
    pub long_totals: Amounts,
}

impl<T> Page<'_, T> {
    /// Detail of fully covered categories is not exported, only their totals.
    pub fn is_suppressed(&self) -> bool {
        self.category.is_fully_covered()
    }

    pub fn totals(&self, holding: HoldingPeriod) -> Amounts {
        match holding {
            HoldingPeriod::Short => self.short_totals,
            HoldingPeriod::Long => self.long_totals,
        }
    }
}

/// Running totals per holding period and category, shared across all pages
/// of a run.
#[derive(Debug, Clone, Default)]
pub struct TradeTotals(BTreeMap<(HoldingPeriod, Category), Amounts>);

impl TradeTotals {
    pub fn get(&self, holding: HoldingPeriod, category: Category) -> Amounts {
        self.0.get(&(holding, category)).copied().unwrap_or_default()
    }

    fn add(&mut self, holding: HoldingPeriod, category: Category, amounts: Amounts) {
        *self.0.entry((holding, category)).or_default() += amounts;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub capacity: usize,
    pub max_pages: usize,
}

impl Paginator {
    /// Split `items` into pages and accumulate their totals into `totals`.
    ///
    /// Categories are visited in order A to F, the items keep their input
    /// order within a category and holding period, and empty categories
    /// produce no pages.
    pub fn paginate<'a, T: LineItem>(
        &self,
        unit: &str,
        items: &'a [T],
        totals: &mut TradeTotals,
    ) -> Result<Vec<Page<'a, T>>, EvalError> {
        let capacity = self.capacity.max(1);
        let mut pages = Vec::new();

        for category in Category::ALL {
            let side = |holding: HoldingPeriod| -> Vec<&'a T> {
                items
                    .iter()
                    .filter(|t| t.category() == category && t.holding_period() == holding)
                    .collect()
            };
            let short = side(HoldingPeriod::Short);
            let long = side(HoldingPeriod::Long);

            let count = short.len().div_ceil(capacity).max(long.len().div_ceil(capacity));
            if pages.len() + count > self.max_pages {
                return Err(EvalError::PageOverflow {
                    unit: unit.to_string(),
                    category: category.code().to_string(),
                    items: short.len() + long.len(),
                    limit: self.max_pages.saturating_mul(capacity),
                });
            }

            let mut short = short.chunks(capacity);
            let mut long = long.chunks(capacity);

            for _ in 0..count {
                let short = short.next().unwrap_or_default().to_vec();
                let long = long.next().unwrap_or_default().to_vec();
                let short_totals = sum(&short);
                let long_totals = sum(&long);

                totals.add(HoldingPeriod::Short, category, short_totals);
                totals.add(HoldingPeriod::Long, category, long_totals);

                pages.push(Page {
                    category,
                    short,
                    long,
                    short_totals,
                    long_totals,
                });
            }
        }

        Ok(pages)
    }
}

fn sum<T: LineItem>(items: &[&T]) -> Amounts {
    let mut total = Amounts::default();
    for item in items {
        total += item.amounts();
    }
    total
}

/// Paginate without a page limit or shared totals.
pub fn aggregate<T: LineItem>(items: &[T], capacity: usize) -> Vec<Page<'_, T>> {
    let paginator = Paginator {
        capacity,
        max_pages: usize::MAX,
    };
    paginator
        .paginate("aggregate", items, &mut TradeTotals::default())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(holding: HoldingPeriod, category: Category, proceeds: f64, cost: f64) -> Trade {
        Trade {
            description: "XYZ".into(),
            quantity: 1.0,
            date_acquired: "01/02/2024".into(),
            date_sold: "03/04/2024".into(),
            proceeds,
            cost,
            wash_sale_adjustment: None,
            wash_sale_code: None,
            holding_period: holding,
            reporting_category: category,
        }
    }

    #[test]
    fn test_split_twenty_short_trades() {
        let trades: Vec<_> = (0..20)
            .map(|i| trade(HoldingPeriod::Short, Category::A, 100.0 + i as f64, 50.0))
            .collect();

        let pages = aggregate(&trades, 14);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].short.len(), 14);
        assert_eq!(pages[1].short.len(), 6);
        assert!(pages.iter().all(|p| p.long.is_empty()));
        assert!(pages.iter().all(|p| p.category == Category::A));
        assert!(pages[0].is_suppressed());
    }

    #[test]
    fn test_empty_categories_emit_nothing() {
        let trades = vec![
            trade(HoldingPeriod::Long, Category::E, 10.0, 5.0),
            trade(HoldingPeriod::Short, Category::B, 10.0, 5.0),
        ];

        let pages = aggregate(&trades, 14);
        let categories: Vec<_> = pages.iter().map(|p| p.category).collect();
        assert_eq!(categories, vec![Category::B, Category::E]);
        assert!(aggregate::<Trade>(&[], 14).is_empty());
    }

    #[test]
    fn test_sides_paginate_independently() {
        let mut trades: Vec<_> = (0..3)
            .map(|_| trade(HoldingPeriod::Short, Category::B, 1.0, 0.0))
            .collect();
        trades.extend((0..16).map(|_| trade(HoldingPeriod::Long, Category::B, 1.0, 0.0)));

        let pages = aggregate(&trades, 14);
        assert_eq!(pages.len(), 2);
        assert_eq!((pages[0].short.len(), pages[0].long.len()), (3, 14));
        assert_eq!((pages[1].short.len(), pages[1].long.len()), (0, 2));
    }

    #[test]
    fn test_gain_sums_to_totals() {
        let mut trades = vec![
            trade(HoldingPeriod::Short, Category::B, 100.005, 33.333),
            trade(HoldingPeriod::Short, Category::B, 0.104, 12.499),
            trade(HoldingPeriod::Short, Category::B, 57.7777, 57.771),
        ];
        trades[1].wash_sale_adjustment = Some(2.226);

        let mut totals = TradeTotals::default();
        let paginator = Paginator {
            capacity: 2,
            max_pages: 10,
        };
        paginator.paginate("test", &trades, &mut totals).unwrap();

        let t = totals.get(HoldingPeriod::Short, Category::B);
        let gains: f64 = trades.iter().map(|t| t.amounts().gain).sum();
        assert!((t.gain - gains).abs() < 0.01);
        assert!((t.gain - (t.proceeds - t.cost + t.adjustment)).abs() < 0.01);
        assert_eq!(totals.get(HoldingPeriod::Long, Category::B), Amounts::default());
    }

    #[test]
    fn test_page_overflow() {
        let trades: Vec<_> = (0..5)
            .map(|_| trade(HoldingPeriod::Short, Category::C, 1.0, 0.0))
            .collect();
        let paginator = Paginator {
            capacity: 2,
            max_pages: 2,
        };

        let err = paginator
            .paginate("Federal/f8949", &trades, &mut TradeTotals::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::PageOverflow { ref category, .. } if category == "C"));
    }
}
