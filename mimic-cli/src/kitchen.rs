//! Kitchen demonstration: a chef robot tested against recording doubles

use mimic_core::prelude::*;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// Ingredient storage
pub trait Refrigerator {
    /// Take out the tomatoes
    fn get_tomatoes(&self);
    /// Take out the peanuts
    fn get_peanuts(&self);
    /// Take out the eggs
    fn get_eggs(&self);
    /// Take out the fish
    fn get_fish(&self);
    /// Take out the black pepper
    fn get_black_pepper(&self);
    /// Take out the tabasco
    fn get_tabasco(&self);
    /// Take out the red savina habanero
    fn get_red_savina_habanero(&self);
}

/// Heat source
pub trait Stove {
    /// Light the burner at `level`
    fn turn_on_burner(&self, level: i32);
    /// Put the burner out
    fn turn_off_burner(&self);
    /// Heat the oven to `temperature`
    fn turn_on_oven(&self, temperature: i32);
    /// Switch the oven off
    fn turn_off_oven(&self);
}

/// A real refrigerator
#[derive(Debug, Default)]
pub struct CoolFood;

impl Refrigerator for CoolFood {
    fn get_tomatoes(&self) {
        tracing::debug!("CoolFood: tomatoes");
    }

    fn get_peanuts(&self) {
        tracing::debug!("CoolFood: peanuts");
    }

    fn get_eggs(&self) {
        tracing::debug!("CoolFood: eggs");
    }

    fn get_fish(&self) {
        tracing::debug!("CoolFood: fish");
    }

    fn get_black_pepper(&self) {
        tracing::debug!("CoolFood: black pepper");
    }

    fn get_tabasco(&self) {
        tracing::debug!("CoolFood: tabasco");
    }

    fn get_red_savina_habanero(&self) {
        tracing::debug!("CoolFood: red savina habanero");
    }
}

/// A real stove; remembers what is lit
#[derive(Debug, Default)]
pub struct GasStove3000 {
    burner: Cell<Option<i32>>,
    oven: Cell<Option<i32>>,
}

impl Stove for GasStove3000 {
    fn turn_on_burner(&self, level: i32) {
        tracing::debug!(level, "GasStove3000: burner on");
        self.burner.set(Some(level));
    }

    fn turn_off_burner(&self) {
        tracing::debug!("GasStove3000: burner off");
        self.burner.set(None);
    }

    fn turn_on_oven(&self, temperature: i32) {
        tracing::debug!(temperature, "GasStove3000: oven on");
        self.oven.set(Some(temperature));
    }

    fn turn_off_oven(&self) {
        tracing::debug!("GasStove3000: oven off");
        self.oven.set(None);
    }
}

/// A prepared course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dish {
    pub michelin_stars: u8,
    pub scoville_units: u32,
}

impl Dish {
    pub fn new(michelin_stars: u8, scoville_units: u32) -> Self {
        Self {
            michelin_stars,
            scoville_units,
        }
    }
}

/// The system under test
pub struct ChefRobot<'a> {
    refrigerator: &'a dyn Refrigerator,
    stove: &'a dyn Stove,
}

impl<'a> ChefRobot<'a> {
    pub fn new(refrigerator: &'a dyn Refrigerator, stove: &'a dyn Stove) -> Self {
        Self {
            refrigerator,
            stove,
        }
    }

    pub fn prepare_starter(&self) -> Dish {
        self.refrigerator.get_tomatoes();
        self.refrigerator.get_eggs();
        self.refrigerator.get_red_savina_habanero();
        self.stove.turn_on_burner(2000);
        self.stove.turn_off_burner();
        Dish::new(0, 100_000)
    }

    pub fn prepare_main_course(&self) -> Dish {
        self.refrigerator.get_fish();
        self.refrigerator.get_black_pepper();
        Dish::new(0, 0)
    }

    pub fn prepare_dessert(&self) -> Dish {
        self.refrigerator.get_eggs();
        self.refrigerator.get_tabasco();
        self.stove.turn_on_burner(100);
        self.stove.turn_off_burner();
        Dish::new(3, 0)
    }
}

pub static GET_TOMATOES: Operation<()> = Operation::new("Refrigerator::get_tomatoes");
pub static GET_PEANUTS: Operation<()> = Operation::new("Refrigerator::get_peanuts");
pub static GET_EGGS: Operation<()> = Operation::new("Refrigerator::get_eggs");
pub static GET_FISH: Operation<()> = Operation::new("Refrigerator::get_fish");
pub static GET_BLACK_PEPPER: Operation<()> = Operation::new("Refrigerator::get_black_pepper");
pub static GET_TABASCO: Operation<()> = Operation::new("Refrigerator::get_tabasco");
pub static GET_RED_SAVINA_HABANERO: Operation<()> =
    Operation::new("Refrigerator::get_red_savina_habanero");

pub static TURN_ON_BURNER: Operation<(i32,)> = Operation::new("Stove::turn_on_burner");
pub static TURN_OFF_BURNER: Operation<()> = Operation::new("Stove::turn_off_burner");
pub static TURN_ON_OVEN: Operation<(i32,)> = Operation::new("Stove::turn_on_oven");
pub static TURN_OFF_OVEN: Operation<()> = Operation::new("Stove::turn_off_oven");

pub struct RefrigeratorMock(pub Mock<dyn Refrigerator>);

impl Refrigerator for RefrigeratorMock {
    fn get_tomatoes(&self) {
        self.0.call(&GET_TOMATOES, (), |real, ()| real.get_tomatoes())
    }

    fn get_peanuts(&self) {
        self.0.call(&GET_PEANUTS, (), |real, ()| real.get_peanuts())
    }

    fn get_eggs(&self) {
        self.0.call(&GET_EGGS, (), |real, ()| real.get_eggs())
    }

    fn get_fish(&self) {
        self.0.call(&GET_FISH, (), |real, ()| real.get_fish())
    }

    fn get_black_pepper(&self) {
        self.0
            .call(&GET_BLACK_PEPPER, (), |real, ()| real.get_black_pepper())
    }

    fn get_tabasco(&self) {
        self.0.call(&GET_TABASCO, (), |real, ()| real.get_tabasco())
    }

    fn get_red_savina_habanero(&self) {
        self.0.call(&GET_RED_SAVINA_HABANERO, (), |real, ()| {
            real.get_red_savina_habanero()
        })
    }
}

pub struct StoveMock(pub Mock<dyn Stove>);

impl Stove for StoveMock {
    fn turn_on_burner(&self, level: i32) {
        self.0
            .call(&TURN_ON_BURNER, (level,), |real, (level,)| real.turn_on_burner(level))
    }

    fn turn_off_burner(&self) {
        self.0
            .call(&TURN_OFF_BURNER, (), |real, ()| real.turn_off_burner())
    }

    fn turn_on_oven(&self, temperature: i32) {
        self.0.call(&TURN_ON_OVEN, (temperature,), |real, (temperature,)| {
            real.turn_on_oven(temperature)
        })
    }

    fn turn_off_oven(&self) {
        self.0.call(&TURN_OFF_OVEN, (), |real, ()| real.turn_off_oven())
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<CallSummary>,
}

/// Outcome of every scenario
#[derive(Debug, Clone, Serialize)]
pub struct KitchenReport {
    pub version: &'static str,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl KitchenReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|scenario| scenario.passed)
    }

    pub fn failures(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|scenario| !scenario.passed)
            .count()
    }
}

/// Mocks for one scenario, recording into one shared recorder
struct Kitchen {
    recorder: Rc<CallRecorder>,
    refrigerator: RefrigeratorMock,
    stove: StoveMock,
}

impl Kitchen {
    fn mocked(config: &MimicConfig) -> Self {
        let recorder = Rc::new(CallRecorder::from_config(&config.recorder));
        Self {
            refrigerator: RefrigeratorMock(Mock::with_recorder(Rc::clone(&recorder))),
            stove: StoveMock(Mock::with_recorder(Rc::clone(&recorder))),
            recorder,
        }
    }

    fn with_real_appliances(config: &MimicConfig) -> Self {
        let recorder = Rc::new(CallRecorder::from_config(&config.recorder));
        Self {
            refrigerator: RefrigeratorMock(Mock::with_recorder_and_delegate(
                Rc::clone(&recorder),
                Box::new(CoolFood),
            )),
            stove: StoveMock(Mock::with_recorder_and_delegate(
                Rc::clone(&recorder),
                Box::new(GasStove3000::default()),
            )),
            recorder,
        }
    }

    fn chef(&self) -> ChefRobot<'_> {
        ChefRobot::new(&self.refrigerator, &self.stove)
    }

    fn outcome(
        &self,
        config: &MimicConfig,
        name: &'static str,
        passed: bool,
        detail: String,
    ) -> ScenarioOutcome {
        if passed {
            tracing::info!(scenario = name, "Scenario passed");
        } else {
            tracing::warn!(scenario = name, detail = %detail, "Scenario failed");
        }

        ScenarioOutcome {
            name,
            passed,
            detail,
            timeline: if config.report.include_timeline {
                self.recorder.timeline()
            } else {
                Vec::new()
            },
        }
    }
}

fn stove_level(config: &MimicConfig) -> ScenarioOutcome {
    let kitchen = Kitchen::mocked(config);
    kitchen.chef().prepare_starter();

    let levels = kitchen.stove.0.find(&TURN_ON_BURNER);
    let level = levels.get::<0>(0).copied();
    kitchen.outcome(
        config,
        "Stove level",
        level.is_some_and(|level| level < 8000),
        format!("first burner level: {:?}", level),
    )
}

fn peanuts_not_used(config: &MimicConfig) -> ScenarioOutcome {
    let kitchen = Kitchen::mocked(config);
    let chef = kitchen.chef();
    chef.prepare_starter();
    chef.prepare_main_course();
    chef.prepare_dessert();

    let calls = kitchen.refrigerator.0.find(&GET_PEANUTS).len();
    kitchen.outcome(
        config,
        "Peanuts not used",
        calls == 0,
        format!("peanut fetches: {}", calls),
    )
}

fn starter_spiciness(config: &MimicConfig) -> ScenarioOutcome {
    let kitchen = Kitchen::with_real_appliances(config);
    let starter = kitchen.chef().prepare_starter();

    kitchen.outcome(
        config,
        "Starter spiciness",
        starter.scoville_units <= 100_000,
        format!("scoville units: {}", starter.scoville_units),
    )
}

fn stove_turned_off(config: &MimicConfig) -> ScenarioOutcome {
    let kitchen = Kitchen::with_real_appliances(config);
    let chef = kitchen.chef();
    chef.prepare_starter();
    chef.prepare_main_course();
    chef.prepare_dessert();

    let calls = kitchen.stove.0.find(&TURN_OFF_BURNER).len();
    kitchen.outcome(
        config,
        "Stove turned off after use",
        calls >= 1,
        format!("burner switch-offs: {}", calls),
    )
}

/// Run every scenario
pub fn run(config: &MimicConfig) -> KitchenReport {
    let scenarios = vec![
        stove_level(config),
        peanuts_not_used(config),
        starter_spiciness(config),
        stove_turned_off(config),
    ];

    KitchenReport {
        version: mimic_core::VERSION,
        scenarios,
    }
}
