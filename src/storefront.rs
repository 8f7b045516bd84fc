//! Interactive shop session: the presentation side of the cart.
//!
//! A [`Storefront`] owns a snapshot of the menu, the [`Cart`] being built and a handle to the
//! ordering service. It reads one command per line and answers on the given writer.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::api::{Category, Customer, MenuEntry};
use crate::backend::Backend;
use crate::cart::{Adjusted, Cart, CartError};
use crate::cli::CLIError;
use crate::errors::Result;
use crate::menu::{filter_by_category, Catalog};

const HELP: &str = "\
Commands:
  menu [category|all]               list the menu (burgers, pizza, sides, drinks)
  add <id>                          add one item to the cart
  remove <id>                       remove an item from the cart
  inc <id> / dec <id>               change the quantity of an item
  cart                              show the cart
  checkout <name>|<phone>|<address> place the order
  help                              show this message
  quit                              leave the shop";

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Menu(Option<Category>),
    Add(u32),
    Remove(u32),
    Adjust(u32, i64),
    Cart,
    Checkout(Customer),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Command, CLIError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let id = || -> std::result::Result<u32, CLIError> {
            if rest.is_empty() {
                return Err(CLIError::MissingParameter("id"));
            }
            rest.parse::<u32>()
                .map_err(|_| CLIError::InvalidParameter(rest.to_string()))
        };

        match word.to_ascii_lowercase().as_str() {
            "menu" => match rest {
                "" | "all" => Ok(Command::Menu(None)),
                category => Ok(Command::Menu(Some(category.parse()?))),
            },
            "add" => Ok(Command::Add(id()?)),
            "remove" => Ok(Command::Remove(id()?)),
            "inc" => Ok(Command::Adjust(id()?, 1)),
            "dec" => Ok(Command::Adjust(id()?, -1)),
            "cart" => Ok(Command::Cart),
            "checkout" => parse_customer(rest).map(Command::Checkout),
            "help" | "" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CLIError::InvalidParameter(other.to_string())),
        }
    }
}

/// Parse `<name>|<phone>|<address>`
fn parse_customer(details: &str) -> std::result::Result<Customer, CLIError> {
    let mut fields = details.split('|').map(str::trim);
    let mut next = |name: &'static str| {
        fields
            .next()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(CLIError::MissingParameter(name))
    };
    Ok(Customer {
        name: next("name")?,
        phone: next("phone")?,
        address: next("address")?,
    })
}

/// Whether the session should go on after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Storefront<B: Backend> {
    backend: B,
    menu: Catalog,
    cart: Cart,
}

impl<B: Backend> Storefront<B> {
    /// Fetch the menu and open a session with an empty cart.
    ///
    /// Nothing can be ordered without a menu, so a failed fetch is returned as is.
    pub fn open(backend: B) -> Result<Self> {
        let menu = Catalog::from_entries(backend.fetch_menu()?);
        info!(items = menu.len(), "Menu loaded");
        Ok(Storefront {
            backend,
            menu,
            cart: Cart::new(),
        })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn menu(&self) -> &Catalog {
        &self.menu
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Process commands until `quit` or the end of the input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", HELP)?;
        for line in input.lines() {
            if self.execute(&line?, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Parse and run a single command
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                notify_error(out, &format!("{}. Type 'help' for the commands.", err))?;
                return Ok(Flow::Continue);
            }
        };
        match command {
            Command::Menu(category) => self.show_menu(category, out)?,
            Command::Add(id) => self.add(id, out)?,
            Command::Remove(id) => self.remove(id, out)?,
            Command::Adjust(id, delta) => self.adjust(id, delta, out)?,
            Command::Cart => self.show_cart(out)?,
            Command::Checkout(customer) => {
                self.checkout(&customer, out)?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub fn show_menu<W: Write>(&self, category: Option<Category>, out: &mut W) -> Result<()> {
        let entries = filter_by_category(self.menu.entries(), category);
        if entries.is_empty() {
            writeln!(out, "No items found")?;
        }
        for entry in entries {
            write_entry(out, entry)?;
        }
        Ok(())
    }

    pub fn add<W: Write>(&mut self, id: u32, out: &mut W) -> Result<()> {
        match self.cart.add_item(&self.menu, id) {
            Ok(line) => {
                let message = format!("{} added to cart!", line.entry.name);
                notify(out, &message)
            }
            Err(err) => notify_cart_error(out, err),
        }
    }

    pub fn remove<W: Write>(&mut self, id: u32, out: &mut W) -> Result<()> {
        match self.cart.remove_item(id) {
            Ok(line) => notify(out, &format!("{} removed from cart", line.entry.name)),
            Err(err) => notify_cart_error(out, err),
        }
    }

    pub fn adjust<W: Write>(&mut self, id: u32, delta: i64, out: &mut W) -> Result<()> {
        match self.cart.adjust_quantity(id, delta) {
            Ok(Adjusted::Updated(line)) => {
                notify(out, &format!("{} x{}", line.entry.name, line.quantity))
            }
            Ok(Adjusted::Removed(line)) => {
                notify(out, &format!("{} removed from cart", line.entry.name))
            }
            Err(err) => notify_cart_error(out, err),
        }
    }

    pub fn show_cart<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.cart.is_empty() {
            writeln!(out, "Your cart is empty")?;
            return Ok(());
        }
        for line in self.cart.lines() {
            writeln!(
                out,
                "{:>3}  {} x{}  {}",
                line.entry.id,
                line.entry.name,
                line.quantity,
                line.line_total()
            )?;
        }
        let totals = self.cart.totals();
        writeln!(out, "Items: {}  Total: {}", totals.item_count, totals.amount)?;
        Ok(())
    }

    /// Submit the cart as an order.
    ///
    /// The cart is only cleared once the server confirms the order. Returns the order id on
    /// success.
    pub fn checkout<W: Write>(&mut self, customer: &Customer, out: &mut W) -> Result<Option<String>> {
        if self.cart.is_empty() {
            notify_error(out, "Your cart is empty! Add some items first.")?;
            return Ok(None);
        }

        let summary = self.cart.checkout_summary();
        writeln!(out, "Order summary:")?;
        for line in self.cart.lines() {
            writeln!(out, "  {} x{}  {}", line.entry.name, line.quantity, line.line_total())?;
        }
        writeln!(out, "  Subtotal: {}", summary.subtotal)?;
        writeln!(out, "  Delivery fee: {}", summary.delivery_fee)?;
        writeln!(out, "  Total: {}", summary.total)?;

        let order = self.cart.to_order_request(customer);
        match self.backend.submit_order(&order) {
            Ok(result) if result.success => {
                let order_id = result.order_id.unwrap_or_default();
                info!(order_id = %order_id, "Order placed");
                writeln!(out, "{}", result.message)?;
                writeln!(out, "Order ID: {}", order_id)?;
                if let Some(estimated_time) = result.estimated_time {
                    writeln!(out, "Estimated delivery: {}", estimated_time)?;
                }
                self.cart.clear();
                Ok(Some(order_id))
            }
            Ok(result) => {
                notify_error(out, &format!("Order refused: {}", result.message))?;
                Ok(None)
            }
            Err(err) => {
                warn!("Error placing order: {}", err);
                notify_error(out, "Failed to place order. Please try again.")?;
                Ok(None)
            }
        }
    }
}

fn write_entry<W: Write>(out: &mut W, entry: &MenuEntry) -> Result<()> {
    writeln!(
        out,
        "{:>3}  {} {:<22} {:>5}  [{}] {}",
        entry.id, entry.image, entry.name, entry.price, entry.category, entry.description
    )?;
    Ok(())
}

fn notify<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "[ok] {}", message)?;
    Ok(())
}

fn notify_error<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "[error] {}", message)?;
    Ok(())
}

fn notify_cart_error<W: Write>(out: &mut W, err: CartError) -> Result<()> {
    notify_error(out, &err.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn run(shop: &mut Storefront<MockBackend>, line: &str) -> String {
        let mut out = Vec::new();
        shop.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn customer() -> Customer {
        Customer {
            name: "Ana".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("menu"), Ok(Command::Menu(None)));
        assert_eq!(Command::parse("menu all"), Ok(Command::Menu(None)));
        assert_eq!(
            Command::parse("menu Pizza"),
            Ok(Command::Menu(Some(Category::Pizza)))
        );
        assert_eq!(Command::parse("ADD 3"), Ok(Command::Add(3)));
        assert_eq!(Command::parse("  remove   4 "), Ok(Command::Remove(4)));
        assert_eq!(Command::parse("inc 2"), Ok(Command::Adjust(2, 1)));
        assert_eq!(Command::parse("dec 2"), Ok(Command::Adjust(2, -1)));
        assert_eq!(Command::parse("cart"), Ok(Command::Cart));
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
        assert_eq!(
            Command::parse("checkout Ana | 555-0100 | 1 Main St"),
            Ok(Command::Checkout(customer()))
        );

        assert_eq!(
            Command::parse("add"),
            Err(CLIError::MissingParameter("id"))
        );
        assert!(Command::parse("add burger").is_err());
        assert!(Command::parse("menu desserts").is_err());
        assert!(Command::parse("dance").is_err());
        assert_eq!(
            Command::parse("checkout Ana|555-0100"),
            Err(CLIError::MissingParameter("address"))
        );
    }

    #[test]
    fn test_open_fails_without_menu() {
        assert!(Storefront::open(MockBackend::failing_menu()).is_err());
    }

    #[test]
    fn test_menu_filter() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        let output = run(&mut shop, "menu drinks");
        assert_eq!(output.lines().count(), 4);
        assert!(output.contains("Coca Cola"));
        assert!(!output.contains("Classic Burger"));

        let output = run(&mut shop, "menu");
        assert_eq!(output.lines().count(), 16);
    }

    #[test]
    fn test_cart_commands() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        assert_eq!(run(&mut shop, "add 1"), "[ok] Classic Burger added to cart!\n");
        run(&mut shop, "add 1");
        run(&mut shop, "add 13");
        assert_eq!(shop.cart().totals().amount, 647);

        let output = run(&mut shop, "cart");
        assert!(output.contains("Classic Burger x2  598"));
        assert!(output.contains("Items: 3  Total: 647"));

        assert_eq!(run(&mut shop, "dec 13"), "[ok] Coca Cola removed from cart\n");
        assert_eq!(run(&mut shop, "inc 1"), "[ok] Classic Burger x3\n");
        assert_eq!(run(&mut shop, "remove 1"), "[ok] Classic Burger removed from cart\n");
        assert!(shop.cart().is_empty());
        assert_eq!(run(&mut shop, "cart"), "Your cart is empty\n");
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        assert_eq!(run(&mut shop, "add 99"), "[error] No item with id 99\n");
        assert_eq!(run(&mut shop, "remove 3"), "[error] No item with id 3\n");
        assert_eq!(run(&mut shop, "inc 3"), "[error] No item with id 3\n");
        assert!(shop.cart().is_empty());
    }

    #[test]
    fn test_empty_checkout_makes_no_call() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        let output = run(&mut shop, "checkout Ana|555-0100|1 Main St");
        assert!(output.starts_with("[error] Your cart is empty!"));
        assert!(shop.backend().submitted().is_empty());
    }

    #[test]
    fn test_checkout_clears_cart() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        run(&mut shop, "add 1");
        run(&mut shop, "add 1");
        run(&mut shop, "add 13");

        let mut out = Vec::new();
        let order_id = shop.checkout(&customer(), &mut out).unwrap();
        assert_eq!(order_id.as_deref(), Some("ORD1"));
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Subtotal: 647"));
        assert!(output.contains("Delivery fee: 40"));
        assert!(output.contains("Total: 687"));
        assert!(output.contains("Order ID: ORD1"));
        assert!(output.contains("Estimated delivery: 30-40 minutes"));

        assert!(shop.cart().is_empty());
        let submitted = shop.backend().submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].total_amount(), Some(687));
        assert_eq!(submitted[0].items.len(), 2);
        assert_eq!(submitted[0].phone().as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_failed_checkout_keeps_cart() {
        let mut shop = Storefront::open(MockBackend::failing_orders()).unwrap();
        run(&mut shop, "add 5");

        let output = run(&mut shop, "checkout Ana|555-0100|1 Main St");
        assert!(output.contains("[error] Failed to place order. Please try again."));
        assert_eq!(shop.cart().quantity_of(5), Some(1));
    }

    #[test]
    fn test_run_session() {
        let mut shop = Storefront::open(MockBackend::new()).unwrap();
        let input = "add 2\nadd 9\nbogus\ncheckout Ana|555-0100|1 Main St\nquit\nadd 3\n";
        let mut out = Vec::new();
        shop.run(input.as_bytes(), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("[error] Invalid parameter 'bogus'"));
        assert!(output.contains("Order ID: ORD1"));
        // Nothing after quit is processed
        assert!(shop.cart().is_empty());
        assert_eq!(shop.backend().submitted().len(), 1);
    }
}
