//! Walkthrough of the full data layer over the in-memory backend
//!
//! Run with `cargo run --example crud_demo`. Set `RUST_LOG=staysync=debug`
//! to watch the operational log alongside the notices.

use anyhow::Result;
use staysync::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🏨 StaySync CRUD demo\n");

    let remote: Arc<dyn RemoteStore> = Arc::new(InMemoryRemote::new());
    let events = EventBus::default();
    NotificationRelay::spawn(&events, Arc::new(TracingNotifier));

    // One store per collection, all publishing to the shared bus
    let rooms = CollectionStore::<Room>::activate(remote.clone(), events.clone()).await;
    let guests = CollectionStore::<Guest>::activate(remote.clone(), events.clone()).await;
    let bookings = CollectionStore::<Booking>::activate(remote.clone(), events.clone()).await;
    let payments = CollectionStore::<Payment>::activate(remote.clone(), events.clone()).await;

    println!("📋 Creating a room and a guest...");
    let room = rooms
        .add(NewRoom {
            number: "101".to_string(),
            room_type: "suite".to_string(),
            status: "available".to_string(),
            rate: dec!(180.00),
            extra: Default::default(),
        })
        .await?;
    let guest = guests.add(NewGuest::new("Ana Souza", "ana@example.com")).await?;
    println!("✅ Room {} and guest {} registered", room.number, guest.name);

    println!("\n📋 Booking the room...");
    let booking = bookings
        .add(NewBooking {
            guest_id: guest.id,
            room_id: room.id,
            check_in: NaiveDate::from_ymd_opt(2026, 9, 1).ok_or_else(|| {
                anyhow::anyhow!("invalid date")
            })?,
            check_out: NaiveDate::from_ymd_opt(2026, 9, 4).ok_or_else(|| {
                anyhow::anyhow!("invalid date")
            })?,
            total_amount: Some(dec!(540.00)),
            status: Some("confirmed".to_string()),
            extra: Default::default(),
        })
        .await?;
    rooms
        .update(
            room.id,
            RoomPatch {
                status: Some("occupied".to_string()),
                ..Default::default()
            },
        )
        .await?;
    println!("✅ Booking {} confirmed, room marked occupied", booking.id);

    println!("\n📋 Taking a payment and settling it...");
    let payment = payments
        .add(NewPayment {
            booking_id: booking.id,
            amount: dec!(540.00),
            status: "pending".to_string(),
            method: Some("card".to_string()),
            extra: Default::default(),
        })
        .await?;
    payments
        .update(payment.id, PaymentPatch::status_change("paid"))
        .await?;
    println!("✅ Payment {} settled", payment.id);

    // The mirrors reflect every confirmed mutation without re-reading
    let snapshot = rooms.snapshot();
    println!(
        "\n📊 Mirror state: {} room(s), {} guest(s), {} booking(s), {} payment(s)",
        snapshot.data.map_or(0, |d| d.len()),
        guests.snapshot().data.map_or(0, |d| d.len()),
        bookings.snapshot().data.map_or(0, |d| d.len()),
        payments.snapshot().data.map_or(0, |d| d.len()),
    );

    // Procedures are server-side; the in-memory backend registers none,
    // so this surfaces as a classified failure rather than a panic
    match bookings
        .check_availability(
            room.id,
            NaiveDate::from_ymd_opt(2026, 10, 1).ok_or_else(|| anyhow::anyhow!("invalid date"))?,
            NaiveDate::from_ymd_opt(2026, 10, 4).ok_or_else(|| anyhow::anyhow!("invalid date"))?,
        )
        .await
    {
        Ok(free) => println!("\n🔍 Room available: {}", free),
        Err(err) => println!("\n🔍 Availability check unavailable here: {}", err.kind().user_phrase()),
    }

    println!("\n✨ Done");
    Ok(())
}
