use std::{
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use carousel_core::{
    Carousel, CarouselConfig, CarouselError, ChangeEvent, HeadlessPager, HeadlessProbe,
    PositionSelected, RemoveAnchor, TransitionOutcome,
};
use clap::{Parser, ValueEnum};
use closure::closure;
use tracing::debug;

mod output;

type DemoCarousel = Carousel<String, HeadlessPager<String>>;

#[derive(Parser)]
#[command(name = "carousel-demo")]
#[command(version, about = "Drive a headless carousel with a step script", long_about = None)]
struct Cli {
    /// Initial items
    #[arg(long, value_delimiter = ',', default_value = "a,b,c,d")]
    items: Vec<String>,
    /// Initial position (clamped into range)
    #[arg(long, default_value_t = 0)]
    position: usize,
    /// Make `select` steps jump without animation
    #[arg(long)]
    no_animate: bool,
    /// Time an animated transition takes to settle
    #[arg(long, default_value_t = 100)]
    settle_delay_ms: u64,
    /// Disable user swipes
    #[arg(long)]
    no_swipe: bool,
    /// How removals before the displayed page are reconciled
    #[arg(long, value_enum, default_value_t = Anchor::KeepIndex)]
    anchor: Anchor,
    /// Steps: select:N jump:N swipe:N insert:ITEM@N append:ITEM remove:N
    /// move:A:B replace:N:ITEM reset:a,b,c tick:MS
    steps: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Anchor {
    KeepIndex,
    FollowItem,
}

impl From<Anchor> for RemoveAnchor {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::KeepIndex => RemoveAnchor::KeepIndex,
            Anchor::FollowItem => RemoveAnchor::FollowItem,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    Select(usize),
    Jump(usize),
    Swipe(usize),
    Change(ChangeEvent<String>),
    Tick(Duration),
}

fn parse_index(value: &str) -> Result<usize> {
    value
        .parse()
        .with_context(|| format!("'{value}' is not a page index"))
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (verb, arg) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected VERB:ARGS"))?;
        let step = match verb {
            "select" => Step::Select(parse_index(arg)?),
            "jump" => Step::Jump(parse_index(arg)?),
            "swipe" => Step::Swipe(parse_index(arg)?),
            "insert" => {
                let (item, index) = arg
                    .rsplit_once('@')
                    .ok_or_else(|| anyhow!("expected insert:ITEM@INDEX"))?;
                Step::Change(ChangeEvent::Add {
                    item: item.to_string(),
                    index: Some(parse_index(index)?),
                })
            }
            "append" => Step::Change(ChangeEvent::Add {
                item: arg.to_string(),
                index: None,
            }),
            "remove" => Step::Change(ChangeEvent::Remove {
                index: parse_index(arg)?,
            }),
            "move" => {
                let (from, to) = arg
                    .split_once(':')
                    .ok_or_else(|| anyhow!("expected move:FROM:TO"))?;
                Step::Change(ChangeEvent::Move {
                    from: parse_index(from)?,
                    to: parse_index(to)?,
                })
            }
            "replace" => {
                let (index, item) = arg
                    .split_once(':')
                    .ok_or_else(|| anyhow!("expected replace:INDEX:ITEM"))?;
                Step::Change(ChangeEvent::Replace {
                    index: parse_index(index)?,
                    item: item.to_string(),
                })
            }
            "reset" => Step::Change(ChangeEvent::Reset {
                items: arg
                    .split(',')
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            }),
            "tick" => {
                let millis: u64 = arg
                    .parse()
                    .with_context(|| format!("'{arg}' is not a duration in milliseconds"))?;
                Step::Tick(Duration::from_millis(millis))
            }
            other => bail!("unknown step '{other}'"),
        };
        Ok(step)
    }
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,carousel_core=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn run_step(
    carousel: &mut DemoCarousel,
    probe: &HeadlessProbe,
    step: Step,
) -> Result<(), CarouselError> {
    match step {
        Step::Select(index) => report(carousel.select(index)?),
        Step::Jump(index) => report(carousel.set_position(index, false)?),
        Step::Swipe(index) => carousel.pump(probe.swipe_to(index)),
        Step::Change(change) => match carousel.enqueue(change)? {
            Some(outcome) => report(outcome),
            None => output::step(format!(
                "queued behind pending transition ({} waiting)",
                carousel.queued_changes()
            )),
        },
        Step::Tick(elapsed) => carousel.pump(probe.advance(elapsed)),
    }
    // Echoes of immediate transitions.
    carousel.pump(probe.take_events());
    Ok(())
}

fn report(outcome: TransitionOutcome) {
    let message = match outcome {
        TransitionOutcome::EmptySource => "nothing to show",
        TransitionOutcome::Unchanged => "displayed page unchanged",
        TransitionOutcome::Settled => "settled",
        TransitionOutcome::Pending => "transition started",
    };
    output::step(message);
}

fn print_state(carousel: &DemoCarousel, probe: &HeadlessProbe) {
    let selected = carousel.selected_item().map_or("-", String::as_str);
    let pending = carousel
        .pending_transition()
        .map(|pending| format!(" -> {}", pending.target))
        .unwrap_or_default();
    output::status(
        "state",
        format!(
            "{} [{}] {}/{} '{}'{} t={}ms",
            output::dots(carousel.highlights()),
            carousel.items().join(","),
            carousel.position(),
            carousel.len(),
            selected,
            pending,
            probe.now().as_millis()
        ),
    );
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let steps = cli
        .steps
        .iter()
        .map(|raw| {
            raw.parse::<Step>()
                .with_context(|| format!("invalid step '{raw}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let config = CarouselConfig::default()
        .animate_transition(!cli.no_animate)
        .swiping_enabled(!cli.no_swipe)
        .show_indicators(true)
        .remove_anchor(cli.anchor.into())
        .settle_delay(Duration::from_millis(cli.settle_delay_ms));
    debug!(?config, "starting demo");

    let pager = HeadlessPager::new(|item: &String| format!("[{item}]"));
    let probe = pager.probe();
    let mut carousel = Carousel::attach(&cli.items, cli.position, pager, config);

    let fired = Arc::new(AtomicUsize::new(0));
    carousel.on_position_selected(closure!(clone fired, |event: PositionSelected| {
        fired.fetch_add(1, Ordering::SeqCst);
        output::event(format!("{} ({:?})", event.position, event.origin));
    }));

    print_state(&carousel, &probe);
    for (raw, step) in cli.steps.iter().zip(steps) {
        output::status("step", raw);
        if let Err(err) = run_step(&mut carousel, &probe, step) {
            output::error(err.to_string());
        }
        print_state(&carousel, &probe);
    }

    carousel.detach();
    output::status(
        "done",
        format!("{} position events", fired.load(Ordering::SeqCst)),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_change_steps() {
        assert_eq!(
            "insert:x@2".parse::<Step>().expect("insert"),
            Step::Change(ChangeEvent::Add {
                item: "x".to_string(),
                index: Some(2),
            })
        );
        assert_eq!(
            "move:3:0".parse::<Step>().expect("move"),
            Step::Change(ChangeEvent::Move { from: 3, to: 0 })
        );
        assert_eq!(
            "reset:".parse::<Step>().expect("reset"),
            Step::Change(ChangeEvent::Reset { items: Vec::new() })
        );
        assert_eq!(
            "tick:250".parse::<Step>().expect("tick"),
            Step::Tick(Duration::from_millis(250))
        );
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!("select".parse::<Step>().is_err());
        assert!("warp:1".parse::<Step>().is_err());
        assert!("insert:x".parse::<Step>().is_err());
        assert!("jump:-1".parse::<Step>().is_err());
    }

    #[test]
    fn queued_removal_applies_after_settle() {
        let pager = HeadlessPager::new(|item: &String| item.clone());
        let probe = pager.probe();
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut carousel = Carousel::attach(&items, 0, pager, CarouselConfig::default());

        run_step(&mut carousel, &probe, Step::Select(2)).expect("select");
        run_step(
            &mut carousel,
            &probe,
            Step::Change(ChangeEvent::Remove { index: 0 }),
        )
        .expect("remove");
        assert_eq!(carousel.queued_changes(), 1);

        run_step(&mut carousel, &probe, Step::Tick(Duration::from_millis(100))).expect("tick");
        assert_eq!(carousel.items(), &["b".to_string(), "c".to_string()]);
        assert_eq!(carousel.selected_item().map(String::as_str), Some("c"));
    }
}
