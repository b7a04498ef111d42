mod half_open;
mod recovery;
