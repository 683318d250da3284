use comfy_table::{Table, presets::UTF8_FULL};
use roundtrip_optimizer::{
    matrix::{CostMatrix, LocationIdx},
    service::{OptimizationReport, RouteStatus},
};
use roundtrip_providers::{cost::Cost, cost_provider::CostMetric};
use serde_json::json;

pub fn format_cost(cost: Cost, metric: CostMetric) -> String {
    match (cost.value(), metric) {
        (None, _) => "unreachable".to_string(),
        (Some(seconds), CostMetric::Duration) => {
            let seconds = seconds.round() as i64;
            format!("{}h {:02}m {:02}s", seconds / 3600, seconds % 3600 / 60, seconds % 60)
        }
        (Some(meters), CostMetric::Distance) => format!("{:.2} km", meters / 1000.0),
    }
}

/// One row per variant, a variant without a tour shows the reason instead.
pub fn report_table(report: &OptimizationReport, metric: CostMetric) -> Table {
    let best = report.best().map(|(name, _)| name);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Variant", "Total cost", "Route"]);

    for (name, outcome) in &report.variants {
        let label = if Some(name.as_str()) == best {
            format!("{name} (best)")
        } else {
            name.clone()
        };

        match outcome {
            Ok(result) => {
                let cost = match result.status() {
                    RouteStatus::Feasible => format_cost(result.total_cost, metric),
                    RouteStatus::ContainsUnreachableEdge => {
                        "unreachable (route contains an edge without a path)".to_string()
                    }
                };
                let route = result
                    .addresses
                    .iter()
                    .enumerate()
                    .map(|(stop, address)| format!("{stop}. {address}"))
                    .collect::<Vec<_>>()
                    .join("\n");

                table.add_row(vec![label, cost, route]);
            }
            Err(err) => {
                table.add_row(vec![label, "no tour".to_string(), err.to_string()]);
            }
        }
    }

    table
}

pub fn report_json(report: &OptimizationReport) -> serde_json::Value {
    let variants: serde_json::Map<String, serde_json::Value> = report
        .variants
        .iter()
        .map(|(name, outcome)| {
            let value = match outcome {
                Ok(result) => json!({
                    "status": result.status(),
                    "total_cost": result.total_cost,
                    "tour": result.tour,
                    "addresses": result.addresses,
                }),
                Err(err) => json!({
                    "status": "no_tour",
                    "reason": err.to_string(),
                }),
            };

            (name.clone(), value)
        })
        .collect();

    json!({
        "matrix_failures": report.matrix_failures,
        "best": report.best().map(|(name, _)| name),
        "variants": variants,
    })
}

pub fn matrix_table(addresses: &[String], matrix: &CostMatrix, metric: CostMetric) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec!["From \\ To".to_string()];
    header.extend((0..addresses.len()).map(|index| index.to_string()));
    table.set_header(header);

    for (from, address) in addresses.iter().enumerate() {
        let mut row = vec![format!("{from}. {address}")];
        row.extend((0..addresses.len()).map(|to| {
            format_cost(
                matrix.get(LocationIdx::new(from), LocationIdx::new(to)),
                metric,
            )
        }));
        table.add_row(row);
    }

    table
}

pub fn matrix_json(addresses: &[String], matrix: &CostMatrix) -> serde_json::Value {
    json!({
        "addresses": addresses,
        "costs": matrix.rows().collect::<Vec<_>>(),
    })
}
