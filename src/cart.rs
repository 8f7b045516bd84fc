use thiserror::Error;

use crate::api::{Customer, MenuEntry, OrderItem, OrderRequest};
use crate::menu::Catalog;

/// Flat delivery fee added to every order, in minor currency units
pub const DELIVERY_FEE: u64 = 40;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The id is not on the menu, or not in the cart, depending on the operation
    #[error("No item with id {0}")]
    NotFound(u32),
}

pub type CartResult<T> = std::result::Result<T, CartError>;

/// A menu entry in the cart, with how many of it were ordered.
///
/// The quantity is never 0 for a line that is in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub entry: MenuEntry,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> u64 {
        self.entry.price as u64 * self.quantity as u64
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        OrderItem {
            id: Some(line.entry.id.into()),
            name: Some(line.entry.name.as_str().into()),
            category: Some(line.entry.category.as_str().into()),
            price: Some(line.entry.price.into()),
            description: Some(line.entry.description.as_str().into()),
            image: Some(line.entry.image.as_str().into()),
            quantity: Some(line.quantity.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of the quantities
    pub item_count: u64,
    /// Sum of price x quantity
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
}

/// What happened to a line after its quantity was changed
#[derive(Debug, Clone, PartialEq)]
pub enum Adjusted {
    Updated(CartLine),
    Removed(CartLine),
}

/// The order being put together, in the order items were first added
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Cart {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, id: u32) -> Option<u32> {
        self.position(id).map(|pos| self.lines[pos].quantity)
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.lines.iter().position(|line| line.entry.id == id)
    }

    /// Add one unit of the menu entry `id`.
    ///
    /// Bumps the quantity of an existing line, or appends a new line with a quantity of 1.
    /// Returns the line as it is after the change.
    pub fn add_item(&mut self, menu: &Catalog, id: u32) -> CartResult<&CartLine> {
        let entry = menu.get(id).ok_or(CartError::NotFound(id))?;
        let pos = match self.position(id) {
            Some(pos) => {
                let line = &mut self.lines[pos];
                line.quantity = line.quantity.saturating_add(1);
                pos
            }
            None => {
                self.lines.push(CartLine {
                    entry: entry.clone(),
                    quantity: 1,
                });
                self.lines.len() - 1
            }
        };
        Ok(&self.lines[pos])
    }

    /// Drop the whole line for `id` and return it
    pub fn remove_item(&mut self, id: u32) -> CartResult<CartLine> {
        let pos = self.position(id).ok_or(CartError::NotFound(id))?;
        Ok(self.lines.remove(pos))
    }

    /// Change the quantity of `id` by `delta`, removing the line if it drops to 0 or below.
    ///
    /// Quantities saturate at `u32::MAX`.
    pub fn adjust_quantity(&mut self, id: u32, delta: i64) -> CartResult<Adjusted> {
        let pos = self.position(id).ok_or(CartError::NotFound(id))?;
        let quantity = (self.lines[pos].quantity as i64).saturating_add(delta);
        if quantity <= 0 {
            return Ok(Adjusted::Removed(self.lines.remove(pos)));
        }
        let line = &mut self.lines[pos];
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Ok(Adjusted::Updated(line.clone()))
    }

    pub fn totals(&self) -> Totals {
        self.lines.iter().fold(
            Totals {
                item_count: 0,
                amount: 0,
            },
            |acc, line| Totals {
                item_count: acc.item_count + line.quantity as u64,
                amount: acc.amount + line.line_total(),
            },
        )
    }

    pub fn checkout_summary(&self) -> CheckoutSummary {
        let subtotal = self.totals().amount;
        CheckoutSummary {
            subtotal,
            delivery_fee: DELIVERY_FEE,
            total: subtotal + DELIVERY_FEE,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Snapshot the cart into the body sent on checkout
    pub fn to_order_request(&self, customer: &Customer) -> OrderRequest {
        OrderRequest {
            items: self.lines.iter().map(OrderItem::from).collect(),
            total: Some(self.checkout_summary().total.into()),
            customer_name: Some(customer.name.as_str().into()),
            phone: Some(customer.phone.as_str().into()),
            address: Some(customer.address.as_str().into()),
        }
    }
}
