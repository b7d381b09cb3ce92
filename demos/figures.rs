//! # Example: figures
//!
//! Interactive figure reader: parses polygons from stdin, batches them as
//! events, and commits every N figures to two subscribers at once, one
//! rendering to stdout and one rendering to a fresh uniquely-named file per
//! batch.
//!
//! Shows how to:
//! - Implement [`Render`] for domain payloads (polygons with area/center).
//! - Batch with [`Dispatcher::push`] and flush with [`Dispatcher::commit`].
//! - Rotate a [`UniqueFileWriter`] so each committed batch gets its own file.
//!
//! ## Commands (whitespace-separated tokens on stdin)
//! ```text
//! rhombus  x1 y1 x2 y2 x3 y3 x4 y4          four vertices, equal sides
//! pentagon x1 y1 ... x5 y5
//! hexagon  x1 y1 ... x6 y6
//! force                                     commit the current batch now
//! exit | e                                  quit (refused while uncommitted)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example figures -- 3
//! ```

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use batchbus::{
    Dispatcher, DispatcherConfig, Event, Render, Sink, StreamWriter, UniqueFileWriter,
};

const DEFAULT_LIMIT: usize = 3;
const SIDE_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Default)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Fixed-arity polygon; `N` decides the figure name in the rendered output.
#[derive(Clone)]
struct Polygon<const N: usize> {
    points: [Point; N],
}

type Rhombus = Polygon<4>;
type Pentagon = Polygon<5>;
type Hexagon = Polygon<6>;

impl<const N: usize> Polygon<N> {
    fn parse(tokens: &mut impl Iterator<Item = String>) -> Result<Self> {
        let mut points = [Point::default(); N];
        for point in &mut points {
            point.x = next_float(tokens)?;
            point.y = next_float(tokens)?;
        }
        Ok(Self { points })
    }

    /// Shoelace formula.
    fn area(&self) -> f64 {
        let mut twice = 0.0;
        for i in 0..N {
            let a = self.points[i];
            let b = self.points[(i + 1) % N];
            twice += a.x * b.y - b.x * a.y;
        }
        (twice / 2.0).abs()
    }

    /// Vertex mean.
    fn center(&self) -> Point {
        let sum = self
            .points
            .iter()
            .fold(Point::default(), |acc, p| Point {
                x: acc.x + p.x,
                y: acc.y + p.y,
            });
        Point {
            x: sum.x / N as f64,
            y: sum.y / N as f64,
        }
    }

    fn figure_name() -> &'static str {
        match N {
            4 => "rhombus",
            5 => "pentagon",
            6 => "hexagon",
            _ => "unknown",
        }
    }
}

impl<const N: usize> Render for Polygon<N> {
    fn render(&self, out: &mut dyn Sink) -> io::Result<()> {
        let center = self.center();
        writeln!(out)?;
        writeln!(out, "type:   {}", Self::figure_name())?;
        writeln!(out, "center: {{ {} {} }}", center.x, center.y)?;
        writeln!(out, "area:   {}", self.area())?;
        write!(out, "points: ")?;
        for p in &self.points {
            write!(out, "{{ {} {} }}", p.x, p.y)?;
        }
        writeln!(out)?;
        writeln!(out)
    }

    fn kind(&self) -> &'static str {
        Self::figure_name()
    }
}

fn next_float(tokens: &mut impl Iterator<Item = String>) -> Result<f64> {
    let raw = tokens
        .next()
        .context("unexpected end of input while reading a point")?;
    raw.parse()
        .with_context(|| format!("`{raw}' is not a number"))
}

fn has_equal_sides(r: &Rhombus) -> bool {
    let closing = r.points[0].distance(r.points[3]);
    (0..3).all(|i| (r.points[i].distance(r.points[i + 1]) - closing).abs() <= SIDE_TOLERANCE)
}

fn parse_limit(mut args: env::Args) -> Result<usize> {
    let _program = args.next();
    let Some(raw) = args.next() else {
        return Ok(DEFAULT_LIMIT);
    };
    if args.next().is_some() {
        bail!("expected at most one argument: the commit limit");
    }
    let limit: usize = raw
        .parse()
        .with_context(|| format!("can't parse limit value `{raw}'"))?;
    if limit == 0 {
        bail!("commit limit must be positive");
    }
    Ok(limit)
}

fn stdin_tokens() -> impl Iterator<Item = String> {
    io::stdin()
        .lines()
        .map_while(Result::ok)
        .flat_map(|line| line.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
}

/// Rotate the batch file, then flush: every committed batch lands in its own
/// uniquely-named file.
async fn flush(
    dispatcher: &Dispatcher,
    files: &UniqueFileWriter,
    uncommitted: &mut usize,
) -> Result<()> {
    if *uncommitted == 0 {
        return Ok(());
    }
    files.rotate().context("can not open a new output file")?;
    dispatcher.commit().await;
    *uncommitted = 0;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let limit = parse_limit(env::args())?;

    let dispatcher = Dispatcher::spawn(DispatcherConfig::default()).await?;
    let files = Arc::new(UniqueFileWriter::default());
    println!("Unique name: {}", files.unique());

    dispatcher
        .subscribe(Arc::new(StreamWriter::new(io::stdout())))
        .await;
    dispatcher.subscribe(files.clone()).await;

    let mut tokens = stdin_tokens();
    let mut uncommitted = 0usize;

    while let Some(command) = tokens.next() {
        let payload: Arc<dyn Render> = match command.as_str() {
            "e" | "exit" => {
                if uncommitted != 0 {
                    println!(
                        "You can't exit till have uncommitted figures.\n\
                         Type `force' to commit immediately."
                    );
                    continue;
                }
                break;
            }
            "force" => {
                flush(&dispatcher, &files, &mut uncommitted).await?;
                continue;
            }
            "rhombus" => {
                let rhombus = Rhombus::parse(&mut tokens)?;
                if !has_equal_sides(&rhombus) {
                    bail!("rhombus sides are not equal");
                }
                Arc::new(rhombus)
            }
            "pentagon" => Arc::new(Pentagon::parse(&mut tokens)?),
            "hexagon" => Arc::new(Hexagon::parse(&mut tokens)?),
            _ => {
                println!("Unknown figure type or command.");
                continue;
            }
        };

        dispatcher.push(Event::new(payload).with_label(command)).await;
        uncommitted += 1;

        if uncommitted == limit {
            flush(&dispatcher, &files, &mut uncommitted).await?;
        }
    }

    // EOF with uncommitted figures hits the dispatcher's fatal teardown
    // path: batched data is never silently dropped.
    dispatcher.shutdown().await;
    Ok(())
}
