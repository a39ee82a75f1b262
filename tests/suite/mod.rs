mod background;
mod dispatch;
mod escalation;
mod options;
