use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use stockbook_core::{MovementId, OrderId, ProductId, ReceiptId};
use stockbook_ledger::{InboundMovement, OutboundMovement, OutboundParent, aggregate};

const SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "28", "30", "32"];

fn build_movements(
    products: usize,
    per_product: usize,
) -> (Vec<InboundMovement>, Vec<OutboundMovement>) {
    let product_ids: Vec<ProductId> = (0..products).map(|_| ProductId::new()).collect();
    let now = Utc::now();

    let mut inbound = Vec::with_capacity(products * per_product);
    let mut outbound = Vec::with_capacity(products * per_product / 2);

    for (pi, product_id) in product_ids.iter().enumerate() {
        let receipt = ReceiptId::new();
        let order = OrderId::new();
        for i in 0..per_product {
            let size = SIZES[(pi + i) % SIZES.len()];
            let color = if i % 3 == 0 { None } else { Some((i % 5) as i64) };
            inbound.push(InboundMovement {
                id: MovementId::new(),
                product_id: *product_id,
                size_code: size.to_string(),
                color_id: color,
                qty: 3,
                receipt_id: receipt,
                created_at: now,
            });
            if i % 2 == 0 {
                outbound.push(OutboundMovement {
                    id: MovementId::new(),
                    product_id: *product_id,
                    size_code: size.to_string(),
                    color_id: color,
                    qty: 1,
                    parent: OutboundParent::Order(order),
                    created_at: now,
                });
            }
        }
    }

    (inbound, outbound)
}

fn bench_aggregate_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_throughput");

    for (products, per_product) in [(10, 100), (50, 200), (100, 500)] {
        let (inbound, outbound) = build_movements(products, per_product);
        let total = (inbound.len() + outbound.len()) as u64;

        group.throughput(Throughput::Elements(total));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{products}x{per_product}")),
            &(inbound, outbound),
            |b, (inbound, outbound)| {
                b.iter(|| {
                    let sheet = aggregate(black_box(inbound), black_box(outbound), None);
                    black_box(sheet.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_rollups(c: &mut Criterion) {
    let (inbound, outbound) = build_movements(100, 200);
    let sheet = aggregate(&inbound, &outbound, None);

    c.bench_function("rollup_by_product", |b| {
        b.iter(|| black_box(sheet.rollup_by_product()))
    });
    c.bench_function("rollup_by_product_color", |b| {
        b.iter(|| black_box(sheet.rollup_by_product_color()))
    });
}

criterion_group!(benches, bench_aggregate_throughput, bench_rollups);
criterion_main!(benches);
