//! Metrics computation for lot data.
//!
//! This module provides pure functions to compute per-lot summaries from the
//! collections loaded for a user. Nothing here reads or writes storage, and
//! every function accepts empty input or an unknown lot id, returning zeros.

use crate::date::{self, MonthLocale};
use crate::models::{Actor, ActorType, Lot, LotId, Purchase, RecordDetails, TraceabilityRecord};

/// Actor costs for a lot, split by actor type.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct CostBreakdown {
    /// Vaccine suppliers
    pub vaccines: f64,
    /// Feed suppliers
    pub feed: f64,
    /// Transporters
    pub transport: f64,
    /// Veterinarians
    pub veterinary: f64,
    /// No actor type maps here; always zero.
    pub other: f64,
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct MonthlyRevenue {
    /// Locale-formatted month label, e.g. `ene 2024`
    pub month: String,
    pub revenue: f64,
}

/// Financial performance of a lot.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct FinancialSummary {
    /// Sum of purchase totals (USD)
    pub total_revenue: f64,
    /// Sum of actor costs (USD)
    pub total_costs: f64,
    /// Net profit over costs, in percent
    pub roi: f64,
    /// Net profit over revenue, in percent
    pub profit_margin: f64,
    pub cost_breakdown: CostBreakdown,
    /// Revenue grouped by purchase month, in order of first appearance
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

impl FinancialSummary {
    /// Compute the summary for `lot_id` with Spanish month labels.
    pub fn compute(lot_id: &LotId, purchases: &[Purchase], actors: &[Actor]) -> Self {
        Self::compute_localized(lot_id, purchases, actors, MonthLocale::default())
    }

    pub fn compute_localized(
        lot_id: &LotId,
        purchases: &[Purchase],
        actors: &[Actor],
        locale: MonthLocale,
    ) -> Self {
        let lot_purchases: Vec<_> = purchases.iter().filter(|p| &p.lot_id == lot_id).collect();
        let lot_actors: Vec<_> = actors.iter().filter(|a| &a.lot_id == lot_id).collect();

        let total_revenue: f64 = lot_purchases.iter().map(|p| p.total_amount).sum();
        let total_costs: f64 = lot_actors.iter().map(|a| a.cost).sum();
        let profit = total_revenue - total_costs;

        let roi = if total_costs > 0.0 {
            profit / total_costs * 100.0
        } else {
            0.0
        };
        let profit_margin = if total_revenue > 0.0 {
            profit / total_revenue * 100.0
        } else {
            0.0
        };

        let mut cost_breakdown = CostBreakdown::default();
        for actor in &lot_actors {
            match actor.actor_type {
                ActorType::VaccineSupplier => cost_breakdown.vaccines += actor.cost,
                ActorType::FeedSupplier => cost_breakdown.feed += actor.cost,
                ActorType::Transporter => cost_breakdown.transport += actor.cost,
                ActorType::Veterinarian => cost_breakdown.veterinary += actor.cost,
            }
        }

        let mut revenue_by_month: Vec<MonthlyRevenue> = Vec::new();
        for purchase in &lot_purchases {
            let month = date::month_label(&purchase.purchase_date, locale);
            match revenue_by_month.iter_mut().find(|m| m.month == month) {
                Some(existing) => existing.revenue += purchase.total_amount,
                None => revenue_by_month.push(MonthlyRevenue {
                    month,
                    revenue: purchase.total_amount,
                }),
            }
        }

        FinancialSummary {
            total_revenue,
            total_costs,
            roi,
            profit_margin,
            cost_breakdown,
            revenue_by_month,
        }
    }
}

/// One growth measurement.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct GrowthPoint {
    pub date: String,
    pub value: f64,
}

/// One vaccine or feed application.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ApplicationEntry {
    pub date: String,
    pub name: String,
    pub quantity: f64,
}

/// Traceability performance of a lot.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct TraceabilitySummary {
    /// Mean quantity of growth records
    pub average_growth: f64,
    pub total_vaccines: u32,
    pub total_food: u32,
    /// Growth records, oldest first
    pub growth_history: Vec<GrowthPoint>,
    /// Vaccine records in the order they were logged
    pub vaccine_history: Vec<ApplicationEntry>,
    /// Feed records in the order they were logged
    pub food_history: Vec<ApplicationEntry>,
}

impl TraceabilitySummary {
    pub fn compute(lot_id: &LotId, records: &[TraceabilityRecord]) -> Self {
        let mut growth: Vec<&TraceabilityRecord> = Vec::new();
        let mut vaccine_history = Vec::new();
        let mut food_history = Vec::new();

        for record in records.iter().filter(|r| &r.lot_id == lot_id) {
            match record.details {
                RecordDetails::Growth(_) => growth.push(record),
                RecordDetails::Vaccine(_) => vaccine_history.push(application(record)),
                RecordDetails::Food(_) => food_history.push(application(record)),
                RecordDetails::Water(_) => {}
            }
        }

        let average_growth = if growth.is_empty() {
            0.0
        } else {
            growth.iter().map(|r| r.quantity).sum::<f64>() / growth.len() as f64
        };

        // stable, so records sharing a date keep their logged order
        growth.sort_by_key(|r| date::sort_key(&r.date));
        let growth_history = growth
            .into_iter()
            .map(|r| GrowthPoint {
                date: r.date.clone(),
                value: r.quantity,
            })
            .collect();

        TraceabilitySummary {
            average_growth,
            total_vaccines: vaccine_history.len() as u32,
            total_food: food_history.len() as u32,
            growth_history,
            vaccine_history,
            food_history,
        }
    }
}

fn application(record: &TraceabilityRecord) -> ApplicationEntry {
    ApplicationEntry {
        date: record.date.clone(),
        name: record.name.clone(),
        quantity: record.quantity,
    }
}

/// Financial totals across every lot of the farm.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct PortfolioSummary {
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,
    /// Profit over costs, in percent
    pub overall_roi: f64,
}

impl PortfolioSummary {
    /// Sum the per-lot summaries. Purchases and actors whose lot no longer
    /// exists are not counted.
    pub fn compute(lots: &[Lot], purchases: &[Purchase], actors: &[Actor]) -> Self {
        let (total_revenue, total_costs) = lots
            .iter()
            .map(|lot| FinancialSummary::compute(&lot.id, purchases, actors))
            .fold((0.0, 0.0), |(revenue, costs), s| {
                (revenue + s.total_revenue, costs + s.total_costs)
            });
        let total_profit = total_revenue - total_costs;
        let overall_roi = if total_costs > 0.0 {
            total_profit / total_costs * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            total_revenue,
            total_costs,
            total_profit,
            overall_roi,
        }
    }
}

/// Activity counters shown on a lot's financial card.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct LotActivity {
    pub purchase_count: u32,
    pub actor_count: u32,
    /// Mean `price_per_kg` over the lot's purchases (USD)
    pub average_price_per_kg: f64,
}

impl LotActivity {
    pub fn compute(lot_id: &LotId, purchases: &[Purchase], actors: &[Actor]) -> Self {
        let prices: Vec<f64> = purchases
            .iter()
            .filter(|p| &p.lot_id == lot_id)
            .map(|p| p.price_per_kg)
            .collect();
        let average_price_per_kg = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        LotActivity {
            purchase_count: prices.len() as u32,
            actor_count: actors.iter().filter(|a| &a.lot_id == lot_id).count() as u32,
            average_price_per_kg,
        }
    }
}
