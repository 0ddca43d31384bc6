//! # Command-Line Front-End
//!
//! Every command drives a view model, exactly as a screen would: it
//! subscribes, waits for the first state, issues the user's intent, and
//! renders the resulting state.
//!
//! ```text
//! inventory list --search pen      HomeViewModel        search_product
//! inventory watch                  HomeViewModel        (every change)
//! inventory show 2                 ItemDetailsViewModel
//! inventory sell 2                 ItemDetailsViewModel reduce_quantity_by_one
//! inventory purchase 2 5           ItemDetailsViewModel purchase
//! inventory delete 2               ItemDetailsViewModel delete_item
//! inventory add Pen 2.50 30        ItemEntryViewModel   save_item
//! inventory add Pen x 30 --strict  (rejected: price is not a number)
//! inventory edit 2 --quantity 12   ItemEditViewModel    save_item
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inventory_core::{first_blank_field, DraftStatus, Item, ItemDetails, ValidationError};
use inventory_ui::{ItemDetailsUiState, ItemDetailsViewModel, StateSubscription, UiError};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::container::AppContainer;
use crate::error::{AppError, AppResult};

/// Track items in stock.
#[derive(Debug, Parser)]
#[command(name = "inventory", version, about)]
pub struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, env = "INVENTORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding config and environment.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List items, optionally filtered by name or id.
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print the list again whenever it changes (Ctrl-C to stop).
    Watch {
        #[arg(short, long)]
        search: Option<String>,

        /// Stop after this many updates.
        #[arg(long)]
        updates: Option<usize>,
    },

    /// Show one item.
    Show { id: i64 },

    /// Add an item. Malformed numbers are stored as zero unless --strict.
    Add {
        name: String,
        price: String,
        quantity: String,

        /// Reject malformed or negative numbers.
        #[arg(long)]
        strict: bool,
    },

    /// Change fields of an item.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },

    /// Sell one unit.
    Sell { id: i64 },

    /// Buy units; stock never drops below zero.
    Purchase { id: i64, quantity: i64 },

    /// Delete an item.
    Delete { id: i64 },
}

/// Runs one command, writing its output to `out`.
pub async fn run<W: Write>(
    command: Command,
    json: bool,
    container: &AppContainer,
    out: &mut W,
) -> AppResult<()> {
    debug!(?command, "Running command");
    let mut printer = Printer { out, json };

    match command {
        Command::List { search } => {
            let vm = container.home_view_model();
            if let Some(text) = search {
                vm.search_product(text);
            }
            let mut sub = vm.subscribe();
            let state = next_state(&mut sub).await?;
            printer.items(&state.item_list, &state)
        }

        Command::Watch { search, updates } => {
            let vm = container.home_view_model();
            if let Some(text) = search {
                vm.search_product(text);
            }
            let search = vm.search_text();
            if !search.is_empty() {
                printer.note(&format!("Watching items matching \"{}\"", search))?;
            }
            let mut sub = vm.subscribe();
            let mut printed = 0;

            loop {
                tokio::select! {
                    state = sub.changed() => {
                        let state = state.ok_or_else(state_closed)?;
                        printer.items(&state.item_list, &state)?;
                        printed += 1;
                        if updates.is_some_and(|limit| printed >= limit) {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            Ok(())
        }

        Command::Show { id } => {
            let (_vm, _sub, state) = open_details(container, id).await?;
            printer.details(&state)
        }

        Command::Add {
            name,
            price,
            quantity,
            strict,
        } => {
            let vm = container.item_entry_view_model();
            let details = ItemDetails::new(name, price, quantity);
            if strict {
                details.try_to_item()?;
            }
            vm.update_ui_state(details.clone());

            match vm.save_item().await? {
                Some(id) => printer.value(&json!({ "id": id }), &format!("Added item {}", id)),
                None => Err(blocked(&details)),
            }
        }

        Command::Edit {
            id,
            name,
            price,
            quantity,
        } => {
            let vm = container.item_edit_view_model(id).await?;
            if !vm.item_exists() {
                return Err(AppError::ItemNotFound(id));
            }

            let mut details = vm.ui_state().item_details;
            if let Some(name) = name {
                details.name = name;
            }
            if let Some(price) = price {
                details.price = price;
            }
            if let Some(quantity) = quantity {
                details.quantity = quantity;
            }
            vm.update_ui_state(details.clone());

            if !vm.save_item().await? {
                return Err(blocked(&details));
            }
            let item = vm.ui_state().item_details.to_item();
            printer.value(&item, &format!("Updated item {}", id))
        }

        Command::Sell { id } => {
            let (vm, mut sub, _) = open_details(container, id).await?;
            let sold = vm.reduce_quantity_by_one().await.map_err(UiError::from)??;
            if !sold {
                return printer.value(
                    &json!({ "id": id, "sold": false }),
                    &format!("Item {} is out of stock", id),
                );
            }
            let state = next_state(&mut sub).await?;
            printer.details(&state)
        }

        Command::Purchase { id, quantity } => {
            let (vm, _sub, _) = open_details(container, id).await?;
            let receipt = vm
                .purchase(quantity)
                .await
                .map_err(UiError::from)??
                .ok_or(AppError::ItemNotFound(id))?;

            let text = format!(
                "Bought {} x {} at {} = {} ({} left)",
                receipt.quantity_ordered,
                receipt.product_name,
                receipt.price_per_item,
                receipt.total_cost,
                receipt.items_left_in_inventory
            );
            printer.value(&receipt, &text)
        }

        Command::Delete { id } => {
            let (vm, _sub, _) = open_details(container, id).await?;
            vm.delete_item().await.map_err(UiError::from)??;
            printer.value(&json!({ "deleted": id }), &format!("Deleted item {}", id))
        }
    }
}

/// Opens the details screen for `id` and waits for its first state.
async fn open_details(
    container: &AppContainer,
    id: i64,
) -> AppResult<(
    ItemDetailsViewModel,
    StateSubscription<ItemDetailsUiState>,
    ItemDetailsUiState,
)> {
    let vm = container.item_details_view_model(id);
    let mut sub = vm.subscribe();
    let state = next_state(&mut sub).await?;
    if state.item_details.id != id {
        return Err(AppError::ItemNotFound(id));
    }
    Ok((vm, sub, state))
}

async fn next_state<T: Clone>(sub: &mut StateSubscription<T>) -> AppResult<T> {
    sub.changed().await.ok_or_else(state_closed)
}

fn state_closed() -> AppError {
    AppError::Internal("screen state closed".into())
}

/// Error for a draft that couldn't be saved.
fn blocked(details: &ItemDetails) -> AppError {
    let err = match details.draft_status() {
        DraftStatus::Empty => ValidationError::required("item"),
        _ => first_blank_field(details).unwrap_or_else(|| ValidationError::required("item")),
    };
    err.into()
}

// =============================================================================
// Output
// =============================================================================

struct Printer<'a, W: Write> {
    out: &'a mut W,
    json: bool,
}

impl<W: Write> Printer<'_, W> {
    fn value<T: Serialize>(&mut self, value: &T, text: &str) -> AppResult<()> {
        if self.json {
            serde_json::to_writer(&mut *self.out, value)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }

    /// Text-only line; JSON output stays one document per state.
    fn note(&mut self, text: &str) -> AppResult<()> {
        if !self.json {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }

    fn items<T: Serialize>(&mut self, items: &[Item], state: &T) -> AppResult<()> {
        if self.json {
            return self.value(state, "");
        }

        if items.is_empty() {
            writeln!(self.out, "No items")?;
            return Ok(());
        }
        writeln!(self.out, "{:>5}  {:<30} {:>10} {:>8}", "ID", "NAME", "PRICE", "QTY")?;
        for item in items {
            writeln!(
                self.out,
                "{:>5}  {:<30} {:>10} {:>8}",
                item.id,
                item.name,
                item.formatted_price(),
                item.quantity
            )?;
        }
        Ok(())
    }

    fn details(&mut self, state: &ItemDetailsUiState) -> AppResult<()> {
        if self.json {
            return self.value(state, "");
        }

        let item = state.item_details.to_item();
        writeln!(self.out, "Item {}", item.id)?;
        writeln!(self.out, "  Name:     {}", item.name)?;
        writeln!(self.out, "  Price:    {}", item.formatted_price())?;
        writeln!(self.out, "  Quantity: {}", item.quantity)?;
        if state.out_of_stock {
            writeln!(self.out, "  (out of stock)")?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
