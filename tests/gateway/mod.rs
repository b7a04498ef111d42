mod composite;
mod degradation;
