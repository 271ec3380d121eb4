use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iff85::codec;
use iff85::id::{ChunkId, ID_JJJJ};
use iff85::{iff, MemoryReader, MemoryWriter, RawChunk, RawEngine};

const CTX: ChunkId = ChunkId(*b"BNCH");

fn bench_scalars(c: &mut Criterion) {
    let values: Vec<u32> = (0..64 * 1024).collect();

    c.bench_function("write_ulong_64k", |b| {
        b.iter(|| {
            let mut out = MemoryWriter::new();
            for v in &values {
                codec::write_ulong(&mut out, black_box(*v), CTX, "value").unwrap();
            }
            out
        })
    });

    let mut out = MemoryWriter::new();
    for v in &values {
        codec::write_ulong(&mut out, *v, CTX, "value").unwrap();
    }
    let bytes = out.into_inner();

    c.bench_function("read_ulong_64k", |b| {
        b.iter(|| {
            let mut r = MemoryReader::new(black_box(&bytes));
            let mut sum = 0u64;
            for _ in 0..values.len() {
                sum += u64::from(codec::read_ulong(&mut r, CTX, "value").unwrap());
            }
            sum
        })
    });
}

fn bench_tree(c: &mut Criterion) {
    let forms: Vec<RawChunk> = (0..256)
        .map(|i| RawChunk::form(ChunkId(*b"TEST"), vec![
            RawChunk::data(ChunkId(*b"HEAD"), vec![i as u8; 21]),
            RawChunk::data(ChunkId(*b"BODY"), vec![0x42u8; 1024]),
        ]))
        .collect();
    let tree = RawChunk::cat(ID_JJJJ, forms);

    c.bench_function("write_tree_256_forms", |b| {
        b.iter(|| {
            let mut out = MemoryWriter::new();
            iff::write_writer(&mut out, black_box(&tree), &RawEngine, &[]).unwrap();
            out
        })
    });

    let mut out = MemoryWriter::new();
    iff::write_writer(&mut out, &tree, &RawEngine, &[]).unwrap();
    let bytes = out.into_inner();

    c.bench_function("read_tree_256_forms", |b| {
        b.iter(|| {
            let mut r = MemoryReader::new(black_box(&bytes));
            iff::read_reader(&mut r, &RawEngine, &[]).unwrap()
        })
    });
}

criterion_group!(benches, bench_scalars, bench_tree);
criterion_main!(benches);
