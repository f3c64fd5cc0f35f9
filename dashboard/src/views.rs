//! Terminal rendering of the dashboard views. Purely presentational.

use alloy::primitives::U256;
use shared::{
    format_base_units, CollateralInfo, DashboardSnapshot, PendingMintRequest,
    ProtocolHealthSnapshot, TransactionPage, STABLECOIN_DECIMALS,
};

// Backend amounts are base-unit decimal strings; show them in human units.
fn human_units(raw: &str, decimals: u8) -> String {
    match U256::from_str_radix(raw, 10) {
        Ok(value) => format_base_units(value, decimals),
        Err(_) => raw.to_string(),
    }
}

pub fn render_overview(
    health: &ProtocolHealthSnapshot,
    collaterals: &[(CollateralInfo, Option<f64>)],
) {
    println!("Protocol status: {}{}", health.status, if health.paused { " (PAUSED)" } else { "" });
    println!("Total collateral: ${:.2}", health.total_collateral_usd);
    println!("Total debt:       ${:.2}", health.total_debt_usd);
    match health.global_collateral_ratio {
        Some(ratio) => println!("Global ratio:     {:.1}%", ratio),
        None => println!("Global ratio:     n/a"),
    }
    println!();
    println!("{:<8} {:<28} {:>10} {:>14}", "SYMBOL", "NAME", "DECIMALS", "PRICE (USD)");
    for (collateral, price) in collaterals {
        let price = match price {
            Some(p) => format!("{:.4}", p),
            None => "-".to_string(),
        };
        println!(
            "{:<8} {:<28} {:>10} {:>14}",
            collateral.symbol, collateral.name, collateral.decimals, price
        );
    }
}

pub fn render_position(collateral: &CollateralInfo, snapshot: &DashboardSnapshot) {
    let position = &snapshot.position;
    println!("Position - {} ({})", collateral.symbol, collateral.address);
    println!(
        "  Deposited:  {} {}",
        human_units(&position.collateral_deposited, collateral.decimals),
        collateral.symbol
    );
    println!("  Debt:       {}", human_units(&position.debt_minted, STABLECOIN_DECIMALS));
    println!("  Value:      ${:.2} collateral / ${:.2} debt",
        position.collateral_value_usd, position.debt_value_usd);
    match position.collateral_ratio {
        Some(ratio) => println!(
            "  Ratio:      {:.1}% (liquidation below {:.1}%)",
            ratio, position.liquidation_threshold
        ),
        None => println!("  Ratio:      n/a (no debt minted)"),
    }

    let oracle = &snapshot.oracle;
    println!(
        "  Oracle:     ${:.4}{} (as of {})",
        oracle.price_usd,
        if oracle.stale { " STALE" } else { "" },
        oracle.updated_at
    );

    let mint = &snapshot.mint_status;
    println!(
        "  Auto-mint:  {}{}",
        if mint.eligible { "eligible" } else { "not eligible" },
        match mint.next_eligible_at {
            Some(at) if !mint.eligible => format!(" (next window {})", at),
            _ => String::new(),
        }
    );
}

pub fn render_history(page: &TransactionPage) {
    println!(
        "Transactions - page {} ({} of {} total)",
        page.page,
        page.items.len(),
        page.total
    );
    println!("{:<10} {:<12} {:>20} {:<10} {}", "ID", "TYPE", "AMOUNT", "STATUS", "TX HASH");
    for tx in &page.items {
        println!(
            "{:<10} {:<12} {:>20} {:<10} {}",
            tx.id, tx.tx_type, tx.amount, tx.status, tx.tx_hash
        );
    }
    if page.has_more() {
        println!("... more available (--page {})", page.page + 1);
    }
}

pub fn render_pending_mints(requests: &[PendingMintRequest]) {
    if requests.is_empty() {
        println!("No pending auto-mint requests");
        return;
    }
    println!("{:<10} {:<44} {:<44} {}", "ID", "ACCOUNT", "COLLATERAL", "REQUESTED");
    for request in requests {
        println!(
            "{:<10} {:<44} {:<44} {}",
            request.id, request.account, request.collateral, request.requested_at
        );
    }
}
