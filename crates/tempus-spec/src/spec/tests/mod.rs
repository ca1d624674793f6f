//! End-to-end scenarios: text through parsing, expansion and the odometer.
