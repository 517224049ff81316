use crate::domain::model::{LineItem, OrderLine};
use crate::domain::ports::Catalog;
use crate::utils::error::{CartError, Result};
use rust_decimal::Decimal;

/// Σ 單價 × 數量，附屬品項一併計入
pub fn calculate_total_price<C: Catalog>(catalog: &C, items: &[LineItem]) -> Result<Decimal> {
    let mut total_price = Decimal::ZERO;

    for item in items {
        let unit_price = catalog.unit_price(item.variant_id)?;
        total_price = unit_price
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line_total| total_price.checked_add(line_total))
            .ok_or(CartError::PriceOverflow {
                variant_id: item.variant_id,
            })?;
    }

    Ok(total_price)
}

pub fn order_lines<C: Catalog>(catalog: &C, items: &[LineItem]) -> Result<Vec<OrderLine>> {
    items
        .iter()
        .map(|item| -> Result<OrderLine> {
            Ok(OrderLine {
                variant_id: item.variant_id,
                quantity: item.quantity,
                unit_price: catalog.unit_price(item.variant_id)?,
                is_companion: item.is_companion(),
            })
        })
        .collect()
}
