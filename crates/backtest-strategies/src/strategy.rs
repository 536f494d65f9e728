//! The closed set of single-instrument strategies.

use backtest_core::{
    traits::{BarContext, SignalGenerator},
    types::{BarSeries, IndicatorFrame, Signal},
};

use crate::{
    BollingerStrategy, KdjStrategy, MaCrossoverStrategy, MacdCrossoverStrategy,
    MacdKdjStrategy, MeanReversionStrategy, RsiStrategy, TurtleStrategy,
    VolatilityBreakoutStrategy,
};

/// Any single-instrument strategy the registry can build.
#[derive(Debug, Clone)]
pub enum Strategy {
    MaCrossover(MaCrossoverStrategy),
    MacdCrossover(MacdCrossoverStrategy),
    Kdj(KdjStrategy),
    Rsi(RsiStrategy),
    Bollinger(BollingerStrategy),
    MacdKdj(MacdKdjStrategy),
    MeanReversion(MeanReversionStrategy),
    Turtle(TurtleStrategy),
    VolatilityBreakout(VolatilityBreakoutStrategy),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Strategy::MaCrossover($s) => $body,
            Strategy::MacdCrossover($s) => $body,
            Strategy::Kdj($s) => $body,
            Strategy::Rsi($s) => $body,
            Strategy::Bollinger($s) => $body,
            Strategy::MacdKdj($s) => $body,
            Strategy::MeanReversion($s) => $body,
            Strategy::Turtle($s) => $body,
            Strategy::VolatilityBreakout($s) => $body,
        }
    };
}

impl SignalGenerator for Strategy {
    fn name(&self) -> &str {
        dispatch!(self, s => s.name())
    }

    fn description(&self) -> &str {
        dispatch!(self, s => s.description())
    }

    fn warmup_period(&self) -> usize {
        dispatch!(self, s => s.warmup_period())
    }

    fn max_entries(&self) -> u32 {
        dispatch!(self, s => s.max_entries())
    }

    fn compute_indicators(&mut self, series: &BarSeries) {
        dispatch!(self, s => s.compute_indicators(series))
    }

    fn on_bar(&self, ctx: &BarContext<'_>) -> Vec<Signal> {
        dispatch!(self, s => s.on_bar(ctx))
    }

    fn indicators(&self) -> IndicatorFrame {
        dispatch!(self, s => s.indicators())
    }

    fn reset(&mut self) {
        dispatch!(self, s => s.reset())
    }
}
