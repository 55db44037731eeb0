//! Settable price feed for tests and testnet demos.
//!
//! Speaks the same `latest_round_data` / `decimals` interface as the real
//! aggregator the vault reads through `oracle::PriceSource`. Anyone may push
//! an answer; never point a production vault at it.

use odra::prelude::*;

use crate::oracle::RoundData;

pub mod events {
    use odra::prelude::*;

    #[odra::event]
    pub struct AnswerUpdated {
        pub current: i64,
        pub round_id: u64,
        pub updated_at: u64,
    }
}

#[odra::module(events = [events::AnswerUpdated])]
pub struct MockPriceFeed {
    decimals: Var<u8>,
    latest_round: Var<u64>,
    rounds: Mapping<u64, RoundData>,
}

#[odra::module]
impl MockPriceFeed {
    pub fn init(&mut self, decimals: u8, initial_answer: i64) {
        self.decimals.set(decimals);
        self.update_answer(initial_answer);
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn latest_round_data(&self) -> RoundData {
        let round_id = self.latest_round.get_or_default();
        self.rounds.get(&round_id).unwrap_or(RoundData {
            round_id,
            answer: 0,
            started_at: 0,
            updated_at: 0,
            answered_in_round: round_id,
        })
    }

    /// Push a new answer stamped with the current block time
    pub fn update_answer(&mut self, answer: i64) {
        let now_secs = self.env().get_block_time() / 1000;
        let round_id = self.latest_round.get_or_default() + 1;
        self.update_round_data(round_id, answer, now_secs, now_secs);
    }

    /// Push a fully specified round (lets tests backdate `updated_at`)
    pub fn update_round_data(&mut self, round_id: u64, answer: i64, updated_at: u64, started_at: u64) {
        self.latest_round.set(round_id);
        self.rounds.set(
            &round_id,
            RoundData {
                round_id,
                answer,
                started_at,
                updated_at,
                answered_in_round: round_id,
            },
        );
        self.env().emit_event(events::AnswerUpdated {
            current: answer,
            round_id,
            updated_at,
        });
    }
}
