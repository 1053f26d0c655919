//! Smart Intersection Simulation Library
//!
//! A single four-way signalized intersection: vehicles arrive
//! stochastically, a two-phase traffic-light state machine arbitrates
//! right-of-way, and a rule-priority agent retimes the phases and
//! pre-empts them for emergency vehicles. Runs headless; transports and
//! dashboards consume engine state through [`sim::SimHandle`].

pub mod sim;
