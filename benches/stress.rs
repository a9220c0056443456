use std::sync::Arc;
use std::time::{Duration, Instant};

use roombook::model::{Collection, NewBooking};
use roombook::store::{BookingStore, StoreError, StoreOptions};
use ulid::Ulid;

fn open_store(label: &str) -> Arc<BookingStore> {
    let dir = std::env::temp_dir().join(format!("roombook_bench_{label}_{}", Ulid::new()));
    std::fs::create_dir_all(&dir).expect("create bench dir");
    Arc::new(BookingStore::open(dir.join("bookings.json"), StoreOptions::default()))
}

/// Hourly slot `n` on a far-future date, spread over `rooms` rooms.
fn slot(n: usize, rooms: usize) -> NewBooking {
    let day = 1 + (n / (rooms * 24)) % 28;
    let hour = (n / rooms) % 24;
    NewBooking {
        office: "HQ".into(),
        room: format!("room-{}", n % rooms),
        date: format!("2999-01-{day:02}"),
        start_time: format!("{hour:02}:00"),
        end_time: format!("{hour:02}:59"),
    }
}

/// Nearest-rank percentile of an ascending sample.
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = (sorted.len() as f64 * p / 100.0).ceil() as usize;
    sorted.get(rank.saturating_sub(1)).copied().unwrap_or_default()
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().map_or(0.0, |d| d.as_secs_f64() * 1000.0),
    );
}

async fn phase1_sequential_creates(n: usize) {
    let store = open_store("sequential");
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();
    for i in 0..n {
        let t = Instant::now();
        store.create(slot(i, 10)).await.expect("create");
        latencies.push(t.elapsed());
    }
    let elapsed = start.elapsed();
    println!(
        "  {n} creates in {:.2}s ({:.0} ops/s)",
        elapsed.as_secs_f64(),
        n as f64 / elapsed.as_secs_f64()
    );
    print_latency("create", &mut latencies);
}

async fn phase2_contended_slots(tasks: usize, per_task: usize) {
    let store = open_store("contended");
    let start = Instant::now();
    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let (mut ok, mut conflicts) = (0usize, 0usize);
            for i in 0..per_task {
                // Every task competes for the same slots
                match store.create(slot(i, 2)).await {
                    Ok(_) => ok += 1,
                    Err(StoreError::Conflict(_)) => conflicts += 1,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
            (ok, conflicts)
        }));
    }
    let (mut ok, mut conflicts) = (0, 0);
    for h in handles {
        let (o, c) = h.await.expect("task");
        ok += o;
        conflicts += c;
    }
    println!(
        "  {tasks} tasks x {per_task} creates: {ok} booked, {conflicts} conflicts in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    assert_eq!(ok, per_task, "each slot must be booked exactly once");
}

async fn phase3_list_and_delete(n: usize) {
    let store = open_store("list_delete");
    for i in 0..n {
        store.create(slot(i, 10)).await.expect("create");
    }

    let mut list_latencies = Vec::new();
    for _ in 0..100 {
        let t = Instant::now();
        let active = store.list_active().await.expect("list");
        list_latencies.push(t.elapsed());
        assert_eq!(active.len(), n);
    }
    print_latency(&format!("list_active ({n} bookings)"), &mut list_latencies);

    let mut delete_latencies = Vec::with_capacity(n);
    for _ in 0..n {
        let t = Instant::now();
        store.delete(Collection::Active, 0).await.expect("delete");
        delete_latencies.push(t.elapsed());
    }
    print_latency("delete(active, 0)", &mut delete_latencies);
}

#[tokio::main]
async fn main() {
    let n: usize = std::env::var("ROOMBOOK_BENCH_N")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(500);

    println!("=== roombook stress benchmark ===");
    println!("bookings per phase: {n}\n");

    println!("[phase 1] sequential create throughput");
    phase1_sequential_creates(n).await;

    println!("\n[phase 2] concurrent creates on contended slots");
    phase2_contended_slots(8, n / 8).await;

    println!("\n[phase 3] list and delete latency");
    phase3_list_and_delete(n).await;

    println!("\n=== benchmark complete ===");
}
