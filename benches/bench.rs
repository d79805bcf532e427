use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridcollide::{narrow, Aabb, Circle, SpatialHash};

fn populated(count: usize) -> (SpatialHash, Vec<gridcollide::ShapeId>) {
   let mut hash = SpatialHash::new(64).unwrap();
   let mut ids = Vec::with_capacity(count);
   for i in 0..count {
      let x = (i % 40) as f64 * 25.0;
      let y = (i / 40) as f64 * 25.0;
      ids.push(if i % 2 == 0 { hash.new_rect(x, y, 30.0, 20.0).unwrap() } else { hash.new_circle(x, y, 14.0).unwrap() });
   }
   (hash, ids)
}

fn criterion_benchmark(c: &mut Criterion) {
   c.bench_function("rect rect separation", |b| b.iter(|| narrow::rect_rect(
      black_box(&Aabb::new(-5.0, -5.0, 5.0, 5.0)),
      black_box(&Aabb::new(3.0, -5.0, 13.0, 5.0)))));
   c.bench_function("rect circle corner separation", |b| b.iter(|| narrow::rect_circle(
      black_box(&Aabb::new(-5.0, -5.0, 5.0, 5.0)),
      black_box(&Circle::new(2.0, 6.0, 6.0)))));

   let (mut hash, ids) = populated(1600);
   c.bench_function("move and reregister", |b| b.iter(|| {
      for &id in ids.iter().step_by(16) {
         hash.translate(id, black_box(3.0), black_box(-3.0)).unwrap();
         hash.translate(id, black_box(-3.0), black_box(3.0)).unwrap();
      }
   }));
   c.bench_function("check collisions", |b| b.iter(|| {
      ids.iter().step_by(16).map(|&id| hash.check_collisions(id).unwrap().len()).sum::<usize>()
   }));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
