use crate::rules::{Bracket, BracketTable};

const INF: f64 = f64::INFINITY;

pub(crate) const FEDERAL_2023: BracketTable = BracketTable {
    name: "Federal 2023 single",
    brackets: &[
        Bracket::new(11000.0, 0.10, 0.0),
        Bracket::new(44725.0, 0.12, 220.0),
        Bracket::new(95375.0, 0.22, 4692.5),
        Bracket::new(182100.0, 0.24, 6600.0),
        Bracket::new(231250.0, 0.32, 21168.0),
        Bracket::new(578125.0, 0.35, 28105.5),
        Bracket::new(INF, 0.37, 39668.0),
    ],
};

pub(crate) const FEDERAL_2024: BracketTable = BracketTable {
    name: "Federal 2024 single",
    brackets: &[
        Bracket::new(11600.0, 0.10, 0.0),
        Bracket::new(47150.0, 0.12, 232.0),
        Bracket::new(100525.0, 0.22, 4947.0),
        Bracket::new(191950.0, 0.24, 6957.5),
        Bracket::new(243725.0, 0.32, 22313.5),
        Bracket::new(609350.0, 0.35, 29625.25),
        Bracket::new(INF, 0.37, 41812.25),
    ],
};

// New York State and City brackets did not change between 2023 and 2024.

pub(crate) const NEW_YORK_STATE: BracketTable = BracketTable {
    name: "New York State single",
    brackets: &[
        Bracket::new(8500.0, 0.04, 0.0),
        Bracket::new(11700.0, 0.045, 42.5),
        Bracket::new(13900.0, 0.0525, 130.25),
        Bracket::new(80650.0, 0.055, 165.0),
        Bracket::new(215400.0, 0.06, 568.25),
        Bracket::new(1077550.0, 0.0685, 2399.15),
        Bracket::new(5000000.0, 0.0965, 32570.55),
        Bracket::new(25000000.0, 0.103, 65070.55),
        Bracket::new(INF, 0.109, 215070.55),
    ],
};

pub(crate) const NEW_YORK_CITY: BracketTable = BracketTable {
    name: "New York City single",
    brackets: &[
        Bracket::new(12000.0, 0.03078, 0.0),
        Bracket::new(25000.0, 0.03762, 82.08),
        Bracket::new(50000.0, 0.03819, 96.33),
        Bracket::new(INF, 0.03876, 124.83),
    ],
};
