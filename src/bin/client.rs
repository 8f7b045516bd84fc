use std::io::{self, Write};
use std::process::ExitCode;

use fastfood::api::{Category, Customer};
use fastfood::backend::{Backend, HttpBackend};
use fastfood::cli::*;
use fastfood::errors::Result;
use fastfood::logging::setup_tracing;
use fastfood::storefront::Storefront;

const USAGE: &str = "\
Usage: client [<host>:<port>] <action> [args...]
Actions:
  menu [category]                                 list the menu
  health                                          check the server
  order <name> <phone> <address> <id>[x<qty>]...  place an order
  shop                                            interactive session";

#[derive(Debug, PartialEq)]
enum Action {
    Menu(Option<Category>),
    Health,
    Order(Customer, Vec<(u32, u32)>),
    Shop,
}

#[derive(Debug, PartialEq)]
struct CLIOptions {
    target: String,
    action: Action,
}

fn parse_action<I>(action: String, mut args: I) -> std::result::Result<Action, CLIError>
where
    I: Iterator<Item = String>,
{
    match action.to_ascii_lowercase().as_str() {
        "menu" => match args.next() {
            None => Ok(Action::Menu(None)),
            Some(category) if category.eq_ignore_ascii_case("all") => Ok(Action::Menu(None)),
            Some(category) => Ok(Action::Menu(Some(category.parse()?))),
        },
        "health" => Ok(Action::Health),
        "shop" => Ok(Action::Shop),
        "order" => {
            let mut next = |name: &'static str| args.next().ok_or(CLIError::MissingParameter(name));
            let customer = Customer {
                name: next("name")?,
                phone: next("phone")?,
                address: next("address")?,
            };
            let items = args
                .map(|item| parse_item_spec(&item))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if items.is_empty() {
                return Err(CLIError::MissingParameter("item id"));
            }
            Ok(Action::Order(customer, items))
        }
        _ => Err(CLIError::InvalidParameter(action)),
    }
}

fn parse_cli_args<I>(mut args: I) -> std::result::Result<CLIOptions, CLIError>
where
    I: Iterator<Item = String>,
{
    args.next(); // Skip the program name
    let maybe_target = args
        .next()
        .ok_or(CLIError::MissingParameter("target or action"))?;

    let (target, action) = match validate_address(&maybe_target) {
        Ok(target) => (
            target.to_string(),
            args.next().ok_or(CLIError::MissingParameter("action"))?,
        ),
        Err(_) => (DEFAULT_ADDRESS.to_string(), maybe_target),
    };

    Ok(CLIOptions {
        target,
        action: parse_action(action, args)?,
    })
}

fn run(options: CLIOptions) -> Result<()> {
    let backend = HttpBackend::new(&options.target);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match options.action {
        Action::Menu(category) => {
            Storefront::open(backend)?.show_menu(category, &mut out)?;
        }
        Action::Health => {
            let report = backend.health()?;
            writeln!(
                out,
                "{} - {} (version {}, {} menu items, at {})",
                report.status, report.message, report.version, report.menu_items, report.timestamp
            )?;
        }
        Action::Order(customer, items) => {
            let mut shop = Storefront::open(backend)?;
            for (id, quantity) in items {
                for _ in 0..quantity {
                    shop.add(id, &mut out)?;
                }
            }
            shop.checkout(&customer, &mut out)?;
        }
        Action::Shop => {
            let mut shop = Storefront::open(backend)?;
            shop.run(io::stdin().lock(), &mut out)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    setup_tracing("warn");

    let options = match parse_cli_args(std::env::args()) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Request failed: {}. Please try again.", err);
            ExitCode::FAILURE
        }
    }
}
