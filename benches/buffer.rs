use bencher::{Bencher, benchmark_group, benchmark_main, black_box};

use buf_fmt::*;

static CHUNK: &[u8] = b"the quick brown fox jumps over the lazy dog\n";

fn append(b: &mut Bencher, buf: &mut dyn Buffer<u8>, n: usize) {
	b.iter(|| {
		buf.clear();
		for _ in 0..n {
			buf.append(CHUNK).unwrap();
		}
		black_box(buf.as_slice());
	})
}

fn append_vec_64(b: &mut Bencher)  { append(b, &mut MemoryBuffer::new(), 64) }
fn append_vec_4k(b: &mut Bencher)  { append(b, &mut MemoryBuffer::new(), 4096) }
fn append_incr_4k(b: &mut Bencher) { append(b, &mut VecBufferBuilder::new().increment(4096).build::<u8>(), 4096) }
fn append_fixed(b: &mut Bencher) {
	let mut data = vec![0u8; 64 * 1024];
	append(b, &mut FixedBuffer::new(&mut data[..]), 4096)
}

fn append_flush_4k(b: &mut Bencher) {
	b.iter(|| {
		let mut v = Vec::new();
		let mut buf = FlushBuffer::new(IoSink::new(&mut v));
		for _ in 0..4096 {
			buf.append(CHUNK).unwrap();
		}
		buf.finish().unwrap();
		black_box(v.len());
	})
}

benchmark_group!(benches,
	append_vec_64,
	append_vec_4k,
	append_incr_4k,
	append_fixed,
	append_flush_4k,
);
benchmark_main!(benches);
