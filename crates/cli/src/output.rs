//! Terminal rendering. Results go to stdout, prompts and logs to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::Write;

use akario_core::{CartLine, Product, User};
use akario_storefront::api::types::{Activity, ContactRecord, UserSummary};
use akario_storefront::checkout::{OrderPlaced, OrderSummary, WidgetRequest};
use akario_storefront::format::{capitalize, format_currency, format_date};
use akario_storefront::notify::Modal;

pub fn prompt(label: &str) {
    eprint!("{label}: ");
    let _ = std::io::stderr().flush();
}

pub fn modal(modal: &Modal) {
    println!("[{}] {}: {}", modal.kind, modal.title, modal.message);
}

pub fn user(user: &User) {
    println!(
        "{} <{}> ({}, id {})",
        user.name,
        user.email,
        capitalize(user.role.as_str()),
        user.id
    );
}

pub fn product_row(product: &Product) {
    let price = format_currency(product.effective_price().amount());
    let discount = product
        .discount
        .filter(|d| !d.is_zero())
        .map(|d| format!(" (-{}%)", d.percent().normalize()))
        .unwrap_or_default();
    println!(
        "{:<26} {:<32} {:<14} {price}{discount}",
        product.id.as_str(),
        product.name,
        product.category
    );
}

pub fn product_detail(product: &Product) {
    product_row(product);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    if let Some(created) = product.created_at {
        println!("  Listed {}", format_date(&created.to_rfc3339()));
    }
}

pub fn cart(lines: &[CartLine], total: rust_decimal::Decimal) {
    if lines.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for line in lines {
        println!(
            "{:>3} x {:<32} {}",
            line.quantity,
            line.product.name,
            format_currency(line.subtotal().amount())
        );
    }
    println!("Total: {}", format_currency(total));
}

pub fn summary(summary: &OrderSummary) {
    println!("Subtotal: {}", format_currency(summary.subtotal.amount()));
    println!("Tax:      {}", format_currency(summary.tax.amount()));
    println!("Total:    {}", format_currency(summary.total.amount()));
}

pub fn widget(request: &WidgetRequest) {
    eprintln!(
        "{} - {}: order {} for {} {} (minor units)",
        request.merchant,
        request.description,
        request.order.id,
        request.order.amount,
        request.order.currency
    );
    eprintln!(
        "Paying as {} <{}>, {}; ship to {}",
        request.prefill.name, request.prefill.email, request.prefill.contact, request.notes_address
    );
}

pub fn placed(placed: &OrderPlaced) {
    println!(
        "Order {} placed: {} paid (payment {})",
        placed.order_id,
        format_currency(placed.total.amount()),
        placed.payment_id
    );
    println!(
        "Continue at {} in {}s",
        placed.redirect_to,
        placed.redirect_after.as_secs()
    );
}

pub fn accounts(rows: &[UserSummary]) {
    for row in rows {
        let blocked = if row.is_blocked { " [blocked]" } else { "" };
        println!(
            "{:<26} {:<24} {}{blocked}",
            row.id.as_str(),
            row.name,
            row.email
        );
    }
}

pub fn activities(rows: &[Activity]) {
    for row in rows {
        let when = row.timestamp.as_deref().map(format_date).unwrap_or_default();
        println!("{when:<20} {} {} {}", row.admin, row.action, row.target);
    }
}

pub fn contacts(rows: &[ContactRecord]) {
    for row in rows {
        println!("{} {} <{}>: {}", row.id, row.name, row.email, row.subject);
        println!("  {}", row.message);
        if let Some(reply) = &row.response {
            println!("  Reply from {}: {}", reply.name, reply.message);
        }
    }
}

pub fn done(message: &str) {
    println!("{message}");
}
