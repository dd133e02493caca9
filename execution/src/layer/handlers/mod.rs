mod plinko;
