mod home;
mod subscriptions;
