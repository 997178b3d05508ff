use metro_core::{Card, LineId, PlatformType, RoundView};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

pub(crate) const RNG_STREAM_LINE_ORDER: &str = "line-order";
pub(crate) const RNG_STREAM_DECK: &str = "deck";

/// Shuffled card deck that silently refills itself once exhausted.
#[derive(Clone, Debug)]
pub(crate) struct Deck {
    template: Vec<Card>,
    cards: Vec<Card>,
    rng: ChaCha8Rng,
}

impl Deck {
    /// Creates the standard ten-card deck shuffled from `seed`.
    #[must_use]
    pub(crate) fn seeded(seed: u64) -> Self {
        Self::with_cards(Card::full_deck(), seed)
    }

    /// Creates a deck from explicit cards shuffled from `seed`.
    ///
    /// Refills reuse the same card list.
    #[must_use]
    pub(crate) fn with_cards(cards: Vec<Card>, seed: u64) -> Self {
        let mut deck = Self {
            template: cards,
            cards: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        deck.refill();
        deck
    }

    /// Removes and returns the next card, refilling first when empty.
    ///
    /// Returns `None` only for a deck built from an empty card list.
    pub(crate) fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            self.refill();
        }
        self.cards.pop()
    }

    fn refill(&mut self) {
        self.cards.clone_from(&self.template);
        self.cards.shuffle(&mut self.rng);
    }
}

/// Draw counters and card flags for the round in progress.
#[derive(Clone, Debug)]
pub(crate) struct RoundState {
    deck: Deck,
    draws: u32,
    center_draws: u32,
    side_draws: u32,
    card: Option<Card>,
    card_used: bool,
    switch_used: bool,
    ended: bool,
}

impl RoundState {
    pub(crate) fn new(deck: Deck) -> Self {
        Self {
            deck,
            draws: 0,
            center_draws: 0,
            side_draws: 0,
            card: None,
            card_used: false,
            switch_used: false,
            ended: false,
        }
    }

    pub(crate) fn card(&self) -> Option<Card> {
        self.card
    }

    pub(crate) fn card_used(&self) -> bool {
        self.card_used
    }

    pub(crate) fn ended(&self) -> bool {
        self.ended
    }

    /// Counts a new card against the round limits. Returns the card and
    /// whether this draw closed the round.
    pub(crate) fn draw(&mut self, draw_limit: u32, platform_limit: u32) -> Option<(Card, bool)> {
        if self.ended {
            return None;
        }
        let card = self.deck.draw()?;
        self.draws += 1;
        match card.platform {
            PlatformType::Center => self.center_draws += 1,
            PlatformType::Side => self.side_draws += 1,
        }
        self.card = Some(card);
        self.card_used = false;
        self.ended = self.draws >= draw_limit
            || self.center_draws >= platform_limit
            || self.side_draws >= platform_limit;
        Some((card, self.ended))
    }

    /// Replaces an unused card without touching any counter.
    pub(crate) fn switch(&mut self) -> Option<Card> {
        if self.ended || self.switch_used || self.card_used || self.card.is_none() {
            return None;
        }
        let card = self.deck.draw()?;
        self.card = Some(card);
        self.switch_used = true;
        Some(card)
    }

    pub(crate) fn consume_card(&mut self) {
        self.card_used = true;
    }

    pub(crate) fn view(&self, round: usize, line: LineId) -> RoundView {
        RoundView {
            round,
            line,
            draws: self.draws,
            center_draws: self.center_draws,
            side_draws: self.side_draws,
            card: self.card,
            card_used: self.card_used,
            switch_used: self.switch_used,
            ended: self.ended,
        }
    }
}

/// Derives an independent RNG seed for a labelled stream of the game.
pub(crate) fn derive_stream_seed(game_seed: u64, label: &str, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(game_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

pub(crate) fn line_order_rng(game_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(game_seed, RNG_STREAM_LINE_ORDER, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metro_core::Symbol;

    fn draw_all(deck: &mut Deck, count: usize) -> Vec<Card> {
        (0..count).filter_map(|_| deck.draw()).collect()
    }

    #[test]
    fn same_seed_reproduces_the_draw_sequence() {
        let mut first = Deck::seeded(17);
        let mut second = Deck::seeded(17);
        assert_eq!(draw_all(&mut first, 25), draw_all(&mut second, 25));
    }

    #[test]
    fn fixed_card_list_is_reproducible() {
        let cards = vec![
            Card::new(PlatformType::Center, Symbol::A),
            Card::new(PlatformType::Side, Symbol::B),
            Card::new(PlatformType::Side, Symbol::Wildcard),
        ];
        let mut first = Deck::with_cards(cards.clone(), 3);
        let mut second = Deck::with_cards(cards, 3);
        assert_eq!(draw_all(&mut first, 9), draw_all(&mut second, 9));
    }

    #[test]
    fn a_full_pass_deals_every_card_once_before_refilling() {
        let mut deck = Deck::seeded(99);
        let mut dealt = draw_all(&mut deck, 10);
        assert!(deck.cards.is_empty());
        let mut expected = Card::full_deck();
        dealt.sort_by_key(|card| (card.platform as u8, card.symbol));
        expected.sort_by_key(|card| (card.platform as u8, card.symbol));
        assert_eq!(dealt, expected);

        assert!(deck.draw().is_some());
        assert_eq!(deck.cards.len(), 9);
    }

    #[test]
    fn round_ends_after_eight_draws_when_platforms_alternate() {
        let cards = vec![
            Card::new(PlatformType::Center, Symbol::A),
            Card::new(PlatformType::Side, Symbol::A),
        ];
        let mut round = RoundState::new(Deck::with_cards(cards, 5));

        for draw in 1..=8 {
            let (_, ended) = round.draw(8, 5).expect("round still open");
            assert_eq!(ended, draw == 8, "draw {draw}");
        }
        assert!(round.draw(8, 5).is_none());
    }

    #[test]
    fn round_ends_when_one_platform_reaches_its_limit() {
        let cards = vec![Card::new(PlatformType::Side, Symbol::C)];
        let mut round = RoundState::new(Deck::with_cards(cards, 5));

        for draw in 1..=5 {
            let (_, ended) = round.draw(8, 5).expect("round still open");
            assert_eq!(ended, draw == 5, "draw {draw}");
        }
        assert!(round.ended());
    }

    #[test]
    fn switch_keeps_counters_and_only_works_once() {
        let mut round = RoundState::new(Deck::seeded(1));
        assert!(round.switch().is_none(), "no card to switch yet");

        let _ = round.draw(8, 5).expect("first draw");
        let before = round.view(0, LineId::new(1));
        assert!(round.switch().is_some());
        let after = round.view(0, LineId::new(1));

        assert_eq!(before.draws, after.draws);
        assert_eq!(before.center_draws, after.center_draws);
        assert_eq!(before.side_draws, after.side_draws);
        assert!(round.switch().is_none());

        let _ = round.draw(8, 5).expect("second draw");
        assert!(round.switch().is_none(), "switch is spent for the round");
    }

    #[test]
    fn used_card_cannot_be_switched() {
        let mut round = RoundState::new(Deck::seeded(1));
        let _ = round.draw(8, 5).expect("draw");
        round.consume_card();
        assert!(round.switch().is_none());
        assert!(round.card_used());
    }

    #[test]
    fn stream_seeds_differ_by_label_and_index() {
        let base = derive_stream_seed(7, RNG_STREAM_DECK, 0);
        assert_eq!(base, derive_stream_seed(7, RNG_STREAM_DECK, 0));
        assert_ne!(base, derive_stream_seed(7, RNG_STREAM_DECK, 1));
        assert_ne!(base, derive_stream_seed(7, RNG_STREAM_LINE_ORDER, 0));
        assert_ne!(base, derive_stream_seed(8, RNG_STREAM_DECK, 0));
    }
}
