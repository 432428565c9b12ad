//! The summary cards showing total income, total expenses and the net balance.

use maud::{Markup, html};

use crate::{dashboard::aggregation::Totals, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md text-center";
const GREEN_TEXT_STYLE: &str = "text-2xl font-bold text-green-600 dark:text-green-400";
const RED_TEXT_STYLE: &str = "text-2xl font-bold text-red-600 dark:text-red-400";

/// Renders the three summary cards for `totals`.
pub(super) fn summary_cards_view(totals: &Totals) -> Markup {
    let net_style = if totals.net >= 0.0 {
        GREEN_TEXT_STYLE
    } else {
        RED_TEXT_STYLE
    };

    html! {
        section id="summary" class="w-full mx-auto mb-6"
        {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                (summary_card("total-income", "Total Income", totals.income, GREEN_TEXT_STYLE))
                (summary_card("total-expenses", "Total Expenses", totals.expense, RED_TEXT_STYLE))
                (summary_card("net-balance", "Net Balance", totals.net, net_style))
            }
        }
    }
}

fn summary_card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm font-semibold text-gray-600 dark:text-gray-400" { (title) }
            p id=(id) class=(amount_style) { (format_currency(amount)) }
        }
    }
}
