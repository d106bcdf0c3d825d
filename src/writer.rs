/*!
Rank-ordered persistence of chain blocks to one shared file.

Every worker holds its full chain in memory until sampling finishes, then
the blocks are appended in rank order: rank 0 truncate-creates the file and
writes first, each following rank appends, and a collective barrier
separates the turns. The file therefore always reads as rank 0's rows, then
rank 1's, and so on, no matter which worker finished sampling first.
*/

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Barrier;

use ndarray::ArrayView2;

/// Writes one chain block: one row per iteration, one tab-separated column
/// per parameter. Truncate-creates the file unless `append` is set. The
/// block is fully flushed before the file closes.
pub fn write_block(path: &Path, append: bool, samples: &ArrayView2<f64>) -> io::Result<()> {
    let file = if append {
        OpenOptions::new().append(true).create(true).open(path)?
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?
    };
    let mut w = BufWriter::new(file);
    for row in samples.rows() {
        let mut first = true;
        for value in row.iter() {
            if !first {
                w.write_all(b"\t")?;
            }
            first = false;
            write!(w, "{value:e}")?;
        }
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Runs one worker's side of the rank-turn protocol: wait until it is this
/// rank's turn, write the block, then keep meeting the barrier until every
/// rank has written. Each worker passes the barrier exactly `world` times.
///
/// An I/O failure aborts the whole process: a worker that simply returned
/// would leave its peers parked at the barrier forever, so the run is taken
/// down instead (fail-fast, no partial-result salvage).
pub fn write_rank_ordered(
    path: &Path,
    rank: usize,
    world: usize,
    barrier: &Barrier,
    samples: &ArrayView2<f64>,
) {
    for turn in 0..world {
        if turn == rank {
            if let Err(err) = write_block(path, rank != 0, samples) {
                eprintln!(
                    "worker {rank}: cannot write chain block to {}: {err}",
                    path.display()
                );
                std::process::abort();
            }
        }
        barrier.wait();
    }
}
