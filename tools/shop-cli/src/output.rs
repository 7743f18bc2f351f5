//! Output formatting for the CLI.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use shop_commerce::cart::{compute_line_display, Cart, CheckoutSummary, ShippingQuote};
use shop_commerce::settings::ShippingSettings;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
    term: Term,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            json,
            term: Term::stderr(),
        }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!(r#"{{"error": "{}"}}"#, msg.replace('"', "\\\""));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Check if stderr is an interactive terminal.
    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

const LINE_WIDTHS: [usize; 5] = [6, 28, 5, 12, 12];

impl Output {
    /// Print cart lines.
    pub fn cart(&self, cart: &Cart) {
        if self.json {
            return;
        }
        if cart.is_empty() {
            self.info("Your cart is empty");
            return;
        }

        self.table_row(&["ID", "PRODUCT", "QTY", "UNIT", "TOTAL"], &LINE_WIDTHS);
        for item in &cart.items {
            let display = compute_line_display(item);
            let unit = match display.original {
                Some(original) => format!(
                    "{} {}",
                    style(original.display()).dim().strikethrough(),
                    style(display.effective.display()).green()
                ),
                None => display.effective.display(),
            };
            self.table_row(
                &[
                    &item.product_id.to_string(),
                    &item.name,
                    &item.quantity.to_string(),
                    &unit,
                    &display.line_total.display(),
                ],
                &LINE_WIDTHS,
            );
        }
    }

    /// Print the checkout summary.
    pub fn summary(&self, summary: &CheckoutSummary) {
        if self.json {
            return;
        }
        self.kv("Items", &summary.item_count.to_string());
        self.kv("Subtotal", &summary.subtotal.display());
        if summary.discount.is_positive() {
            let label = match &summary.applied_coupon {
                Some(code) => format!("Discount ({})", code),
                None => "Discount".to_string(),
            };
            self.kv(&label, &format!("-{}", summary.discount.display()));
        }
        let shipping = match summary.shipping {
            ShippingQuote::Free => style("Free").green().to_string(),
            ShippingQuote::Calculating => style("calculating").dim().to_string(),
            quote => quote.label(),
        };
        self.kv("Shipping", &shipping);
        self.kv("Total", &style(summary.grand_total.display()).bold().to_string());

        if let Some(remaining) = summary.remaining_for_free_shipping {
            if remaining.is_positive() {
                self.info(&format!(
                    "Add {} more for free shipping",
                    remaining.display()
                ));
            }
        }
    }

    /// Print shipping settings.
    pub fn shipping_settings(&self, settings: &ShippingSettings) {
        if self.json {
            return;
        }
        self.kv("Flat shipping fee", &settings.flat_fee.display());
        self.kv(
            "Free shipping from",
            &settings.free_shipping_threshold.display(),
        );
    }
}
