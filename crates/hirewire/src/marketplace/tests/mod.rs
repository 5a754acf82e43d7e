mod common;
mod matching;
mod ranking;
mod routing;
