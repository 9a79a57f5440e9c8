//! Where refreshed world views go.

use quarry_core::render::render;
use quarry_core::world::World;
use std::io::{self, Write};

/// Receives the world every time the dispatcher re-renders it.
pub trait ViewSink {
    fn refresh(&mut self, world: &World) -> io::Result<()>;
}

/// Prints the bordered grid to a writer, one frame per refresh.
#[derive(Debug)]
pub struct GridPrinter<W: Write> {
    out: W,
}

impl<W: Write> GridPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl GridPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ViewSink for GridPrinter<W> {
    fn refresh(&mut self, world: &World) -> io::Result<()> {
        self.out.write_all(render(world).as_bytes())?;
        self.out.flush()
    }
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl ViewSink for Discard {
    fn refresh(&mut self, _world: &World) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every rendered frame in memory.
impl ViewSink for Vec<String> {
    fn refresh(&mut self, world: &World) -> io::Result<()> {
        self.push(render(world));
        Ok(())
    }
}

impl<S: ViewSink + ?Sized> ViewSink for &mut S {
    fn refresh(&mut self, world: &World) -> io::Result<()> {
        (**self).refresh(world)
    }
}
