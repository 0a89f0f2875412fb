use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::seq::IndexedRandom;

use termvid::cli::Args;
use termvid::interrupt::{self, CancelToken};
use termvid::player::{Player, PlayerConfig};
use termvid::renderer::shared_out;
use termvid::source::{self, SequenceSource};
use termvid::still::{self, Paddings};
use termvid::{resize, Frame};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);
    debug!("args: {:?}", args);

    let (width_limit, height_limit) = args.limits();
    let config = PlayerConfig {
        width_limit,
        height_limit,
        paddings: Paddings {
            begin: args.begin_padding,
            end: args.end_padding,
            left: args.left_padding,
        },
        interpolation: args.filter,
        fast: args.fast,
    };

    let path = Path::new(&args.path);
    if path.is_dir() {
        // Directory: pick one image at random and show it.
        let frame = decode_random_image(path)?;
        return show_still(frame, &config);
    }

    let source = SequenceSource::open(&args.path, args.fps)
        .with_context(|| format!("opening {}", args.path))?;

    let cancel = CancelToken::new();
    interrupt::install(cancel.clone());

    let out = shared_out(Box::new(io::stdout()));
    Player::new(source, config, out).with_cancel(cancel).run()
}

fn show_still(frame: Frame, config: &PlayerConfig) -> Result<()> {
    let target = resize::fit(
        frame.width(),
        frame.height(),
        config.width_limit,
        config.height_limit,
    );
    let frame = resize::resize_frame(frame, target, config.interpolation);
    let mut stdout = io::stdout();
    still::display(&frame, config.paddings, &mut stdout).context("writing image")
}

fn decode_random_image(dir: &Path) -> Result<Frame> {
    let mut images: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| source::is_image_file(p))
        .collect();
    images.sort();
    let Some(choice) = images.choose(&mut rand::rng()) else {
        bail!("{} does not contain any image files", dir.display());
    };
    info!("picked {}", choice.display());
    source::decode_image(choice).map_err(Into::into)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
