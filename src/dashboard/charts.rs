//! Chart generation and rendering for the dashboard.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! rendered as an HTML container plus the JavaScript that initializes it.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Color, JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{dashboard::aggregation::Totals, html::HeadElement};

/// Slice colours: green for income, red for expenses.
const INCOME_COLOR: &str = "#16a34a";
const EXPENSE_COLOR: &str = "#dc2626";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-6"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[300px] rounded-lg shadow bg-white dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A two-slice pie chart comparing total income against total expenses.
pub(super) fn overview_chart(totals: &Totals) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Financial Overview Chart")
                .left("center"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("3%"))
        .color(vec![Color::from(INCOME_COLOR), Color::from(EXPENSE_COLOR)])
        .series(
            Pie::new()
                .name("Financial Overview")
                .radius("60%")
                .data(vec![(totals.income, "Income"), (totals.expense, "Expense")]),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
