mod autoscaler;
mod cycle;
mod dispatch;
mod worker;
