pub mod trade_event;
