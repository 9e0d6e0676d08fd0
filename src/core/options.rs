use parking_lot::RwLock;

/// Global render options, set once by the binary before rendering starts.
#[derive(Debug, Default, Clone)]
pub struct RenderOptions {
    pub quiet: bool,
    pub n_threads: u32,
}

lazy_static! {
    static ref OPTIONS: RwLock<RenderOptions> = RwLock::new(RenderOptions::default());
}

pub fn options() -> RenderOptions {
    OPTIONS.read().clone()
}

pub fn set_options(o: RenderOptions) {
    *OPTIONS.write() = o;
}
